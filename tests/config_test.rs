use std::env;
use std::io::Write;
use std::path::Path;

use rstest::rstest;
use tempfile::{Builder, NamedTempFile};

use nestset::config::Settings;
use nestset::domain::{Descriptor, NestError, NestingPolicy, Position};
use nestset::util::testing::init_test_setup;

fn toml_file(content: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[rstest]
fn given_no_sources_when_loading_then_defaults() {
    init_test_setup();
    let settings = Settings::load(None).unwrap();
    assert!(!settings.auto_nest);
    assert_eq!(settings.default_position, Descriptor::At(Position::Last));
    assert_eq!(settings.start_index, 0);
    assert_eq!(settings.policy(), NestingPolicy::Manual);
}

#[rstest]
fn given_config_file_when_loading_then_file_values_win() {
    init_test_setup();
    let file = toml_file(
        r#"
auto_nest = true
default_position = "first"
start_index = 3
"#,
    );

    let settings = Settings::load(Some(file.path())).unwrap();

    assert!(settings.auto_nest);
    assert_eq!(settings.policy(), NestingPolicy::AutoNest);
    assert_eq!(settings.default_position, Descriptor::At(Position::First));
    assert_eq!(settings.start_index, 3);
}

#[rstest]
fn given_offset_in_file_when_loading_then_offset_descriptor() {
    let file = toml_file("default_position = -2\n");
    let settings = Settings::load(Some(file.path())).unwrap();
    assert_eq!(settings.default_position, Descriptor::Offset(-2));
}

#[rstest]
fn given_missing_file_when_loading_then_config_error() {
    let result = Settings::load(Some(Path::new("/nonexistent/nestset.toml")));
    assert!(matches!(result, Err(NestError::Config { .. })));
}

#[rstest]
fn given_env_var_when_loading_then_env_overrides_file() {
    init_test_setup();
    let file = toml_file("start_level = 1\n");
    env::set_var("NESTSET__START_LEVEL", "4");

    let settings = Settings::load(Some(file.path()));
    env::remove_var("NESTSET__START_LEVEL");

    assert_eq!(settings.unwrap().start_level, 4);
}

#[rstest]
fn given_toml_string_when_parsing_then_missing_keys_default() {
    let settings = Settings::from_toml_str("start_level = 2").unwrap();
    assert_eq!(settings.start_level, 2);
    assert_eq!(settings.default_position, Descriptor::At(Position::Last));
    assert!(!settings.auto_nest);
}

#[rstest]
#[case("default_position = \"middle\"", NestError::InvalidPosition("middle".into()))]
#[case("default_position = \"Sideways\"", NestError::InvalidPosition("sideways".into()))]
fn given_unknown_position_token_then_invalid_position(
    #[case] content: &str,
    #[case] expected: NestError,
) {
    assert_eq!(Settings::from_toml_str(content).unwrap_err(), expected);
}

#[rstest]
#[case("default_position = true", "boolean")]
#[case("default_position = 1.5", "float")]
#[case("default_position = [1]", "array")]
fn given_wrong_kind_of_position_then_invalid_argument_kind(
    #[case] content: &str,
    #[case] kind: &str,
) {
    assert_eq!(
        Settings::from_toml_str(content).unwrap_err(),
        NestError::InvalidArgumentKind(kind.into())
    );
}

#[rstest]
fn given_wrong_kind_of_position_in_file_when_loading_then_invalid_argument_kind() {
    let file = toml_file("default_position = false\n");
    assert_eq!(
        Settings::load(Some(file.path())).unwrap_err(),
        NestError::InvalidArgumentKind("boolean".into())
    );
}

#[rstest]
fn given_unknown_token_in_file_when_loading_then_invalid_position() {
    let file = toml_file("default_position = \"middle\"\n");
    assert_eq!(
        Settings::load(Some(file.path())).unwrap_err(),
        NestError::InvalidPosition("middle".into())
    );
}

#[rstest]
fn given_broken_toml_when_parsing_then_config_error() {
    assert!(matches!(
        Settings::from_toml_str("start_index = "),
        Err(NestError::Config { .. })
    ));
}
