use microexpress::template::substitute;
use std::collections::HashMap;

#[test]
fn test_substitute_replaces_every_occurrence() {
    let vars = HashMap::from([
        ("name".to_string(), "Ada".to_string()),
        ("lang".to_string(), "Rust".to_string()),
    ]);

    assert_eq!(
        substitute("{{name}} writes {{lang}}; {{name}} again. {{other}}", &vars),
        "Ada writes Rust; Ada again. {{other}}"
    );
}

#[test]
fn test_substitute_without_vars_is_identity() {
    assert_eq!(substitute("{{x}} stays", &HashMap::new()), "{{x}} stays");
}
