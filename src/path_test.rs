use super::*;

#[test]
fn basename_strips_directories_and_extension() {
    assert_eq!(basename("assets/images/logo.png", false), "logo");
    assert_eq!(basename("assets/images/logo.min.png", false), "logo");
    assert_eq!(basename("logo.png", true), "logo.png");
    assert_eq!(basename("https://cdn.example.com/a/b.json", true), "b.json");
}

#[test]
fn basename_of_directory_path_is_empty() {
    assert_eq!(basename("assets/", false), "");
}

#[test]
fn extension_is_lowercase_without_query() {
    assert_eq!(extension("a/B.PNG"), "png");
    assert_eq!(extension("data.json?v=3"), "json");
    assert_eq!(extension("noext"), "noext");
}
