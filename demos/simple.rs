use flon_core::Flon;

fn main() {
    let flon_data = r#"
@root (
    app: "MyApp"
    version: "1.0.0"
    debug: bool: true
)
"#;

    let mut flon = Flon::new();
    match flon.parse(flon_data) {
        Ok(()) => {
            let app = flon.get("root/app").unwrap();
            let debug_type = flon.get_type("root/debug").unwrap();
            println!("app = {app:?}, debug is {debug_type}");
            println!("{}", flon.pretty("root").unwrap());
        }
        Err(e) => {
            eprintln!("Failed to parse FLON: {:?}", miette::Report::new(e));
        }
    }
}
