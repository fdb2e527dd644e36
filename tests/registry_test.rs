//! Tests for endpoint resolution and the built-in preset table.

use std::time::Duration;

use muninn::registry::preset;
use muninn::{EndpointDescriptor, EndpointRegistry, EndpointSpec, MuninnError};
use serde::Deserialize;

#[test]
fn preset_resolves_known_paths() {
    let registry = EndpointRegistry::from_descriptors(preset::eve_api()).unwrap();
    assert_eq!(registry.len(), 52);

    let sheet = registry.resolve("/char/CharacterSheet.xml.aspx").unwrap();
    assert_eq!(sheet.parameter_names, vec!["userID", "apiKey", "characterID"]);
    assert_eq!(sheet.ttl, Duration::from_secs(3600));

    let skills = registry.resolve("/eve/SkillTree.xml.aspx").unwrap();
    assert!(skills.parameter_names.is_empty());
    assert_eq!(skills.ttl, Duration::from_secs(24 * 3600));

    let status = registry.resolve("/server/ServerStatus.xml.aspx").unwrap();
    assert_eq!(status.ttl, Duration::from_secs(180));
}

#[test]
fn resolution_is_exact_match() {
    let registry = EndpointRegistry::from_descriptors(preset::eve_api()).unwrap();
    assert!(registry.resolve("/unknown/Path.xml.aspx").is_none());
    assert!(registry.resolve("/char/charactersheet.xml.aspx").is_none());
    assert!(registry.resolve("/char/CharacterSheet.xml.aspx/").is_none());
    // The one lowercase path in the upstream API is registered as-is.
    assert!(registry.resolve("/char/mailinglists.xml.aspx").is_some());
}

#[test]
fn duplicate_path_is_rejected() {
    let d = EndpointDescriptor::new("/e", &[], Duration::from_secs(60));
    let mut registry = EndpointRegistry::new();
    registry.insert(d.clone()).unwrap();
    let err = registry.insert(d).unwrap_err();
    assert!(matches!(err, MuninnError::Configuration(_)));
}

#[test]
fn spec_conversion_validates() {
    let good = EndpointSpec {
        path: "/custom/Thing.xml.aspx".to_string(),
        parameters: vec!["id".to_string()],
        ttl_secs: 60,
    };
    let descriptor: EndpointDescriptor = good.try_into().unwrap();
    assert_eq!(descriptor.name, "/custom/Thing.xml.aspx");
    assert_eq!(descriptor.ttl, Duration::from_secs(60));

    let zero_ttl = EndpointSpec {
        path: "/x".to_string(),
        parameters: Vec::new(),
        ttl_secs: 0,
    };
    assert!(EndpointDescriptor::try_from(zero_ttl).is_err());

    let relative = EndpointSpec {
        path: "no-slash".to_string(),
        parameters: Vec::new(),
        ttl_secs: 60,
    };
    assert!(EndpointDescriptor::try_from(relative).is_err());
}

#[test]
fn specs_deserialize_from_toml() {
    #[derive(Deserialize)]
    struct Wrapper {
        endpoints: Vec<EndpointSpec>,
    }

    let wrapper: Wrapper = toml::from_str(
        r#"
            [[endpoints]]
            path = "/eve/SkillTree.xml.aspx"
            ttl_secs = 86400

            [[endpoints]]
            path = "/char/SkillQueue.xml.aspx"
            parameters = ["userID", "apiKey", "characterID"]
            ttl_secs = 900
        "#,
    )
    .unwrap();

    assert_eq!(wrapper.endpoints.len(), 2);
    assert!(wrapper.endpoints[0].parameters.is_empty());
    assert_eq!(wrapper.endpoints[1].parameters.len(), 3);
    assert_eq!(wrapper.endpoints[1].ttl_secs, 900);
}
