use std::path::Path;

use coltype_casetest::RunConfig;

pub fn main() {
    let paths = coltype_casetest::find_files(Path::new("cases/standard")).unwrap();
    coltype_casetest::run(paths, RunConfig::default(), "type_cases").unwrap();
}
