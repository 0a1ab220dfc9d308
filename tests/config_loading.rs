use crate::common::TestRenderer;
use docnav::build::Site;
use serde::Deserialize;

mod common;

#[test]
fn it_loads_custom_configuration() {
    #[derive(Debug, Deserialize, PartialEq, Eq, Default)]
    #[serde(rename_all = "kebab-case")]
    struct TestData {
        test_item: String,
    }

    let dest = tempfile::tempdir().expect("failed to create temp dir");
    let renderer = TestRenderer::default();
    let mut site = Site::load(common::test_dir("site")).expect("failed to load site");

    site.with_renderer(renderer.clone())
        .with_destination(dest.path());
    site.build().expect("failed to build site");

    let expected = TestData {
        test_item: String::from("test"),
    };

    let config = renderer.config();
    let actual: Option<TestData> = config
        .get("test-section")
        .expect("should be deserializable");

    assert_eq!(Some(expected), actual);
    assert_eq!(config.site.title.as_deref(), Some("Example"));
}

#[test]
fn it_falls_back_to_defaults_without_a_config_file() {
    let site = Site::load(common::test_dir("broken")).expect("failed to load site");

    assert_eq!(site.config().site.title, None);
    assert_eq!(site.sidebars().names().collect::<Vec<_>>(), ["Docs"]);
}
