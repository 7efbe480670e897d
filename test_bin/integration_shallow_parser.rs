use std::path::Path;

use coltype::ParserConfig;
use coltype_casetest::RunConfig;

/// Cases run with a small nesting limit.
pub fn main() {
    let paths = coltype_casetest::find_files(Path::new("cases/shallow")).unwrap();
    let conf = RunConfig {
        parser: ParserConfig::default().with_max_depth(3),
    };
    coltype_casetest::run(paths, conf, "shallow_parser").unwrap();
}
