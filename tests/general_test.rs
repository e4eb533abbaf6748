use flon_core::parser::Parser;
use miette::Report;
use std::fs;

#[test]
fn test_all_flon_fixtures() {
    let tests_dir = "./tests";
    let entries = fs::read_dir(tests_dir).expect("Failed to read tests directory");

    for entry in entries {
        let entry = entry.expect("Failed to read directory entry");
        let path = entry.path();

        if path.is_file() && path.extension().is_some_and(|ext| ext == "flon") {
            println!("Parsing file: {:?}", path);
            let source = fs::read_to_string(&path)
                .unwrap_or_else(|_| panic!("Failed to read file: {:?}", path));

            let mut parser = Parser::new_with_name(&source, path.to_str().unwrap().to_string())
                .expect("Lexer failed");

            if let Err(err) = parser.parse_document() {
                panic!("Failed to parse {:?}. Error: {:#?}", path, Report::new(err));
            }
        }
    }
}
