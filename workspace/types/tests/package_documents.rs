#[cfg(test)]
mod package_documents_tests {
    use env_logger::Env;
    use serde_json::{json, Value};
    use std::fs;
    use tempfile::tempdir;
    use types::config::{ConfigFile, PackageConfig};
    use types::defaults::CONFIG_FILE_NAME;
    use types::package::{DescriptorError, PackageDescriptor};
    use types::package_type::PackageType;

    fn init_logger() {
        let _ = env_logger::Builder::from_env(Env::default().default_filter_or("debug"))
            .is_test(true)
            .try_init();
    }

    #[test]
    fn test_decode_encode_zip_package() {
        init_logger();
        let document = json!({
            "name_template": "pkg-{version}",
            "type": "Zip",
            "compressionLevel": 9,
            "tags": ["x", "y"]
        });

        let descriptor = PackageDescriptor::try_from(document.clone()).unwrap();
        assert_eq!(descriptor.name_template(), "pkg-{version}");
        assert_eq!(descriptor.package_type(), PackageType::Zip);

        let configuration: Value = Value::Object(descriptor.configuration().clone().into_inner());
        assert_eq!(configuration, json!({"compressionLevel": 9, "tags": ["x", "y"]}));

        assert_eq!(Value::from(&descriptor), document);
    }

    #[test]
    fn test_packages_directory_lookup() {
        init_logger();
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{
                "packages": [
                    { "name_template": "MaaBundle-{version}", "type": "Bundle" },
                    { "name_template": "MaaCore-{version}", "type": "Zip", "files": { "include": ["*.dll"] } }
                ]
            }"#,
        )
        .unwrap();

        let location = Some(dir.path().to_string_lossy().to_string());
        let typed = PackageConfig::load(location.clone()).unwrap();
        let generic = ConfigFile::<PackageConfig>::load_and_parse(location).unwrap();
        assert_eq!(typed, generic);

        let core = typed.find("MaaCore-{version}").unwrap();
        assert_eq!(
            core.config_value("files"),
            Some(&json!({ "include": ["*.dll"] }))
        );
    }

    #[test]
    fn test_rewrite_package_keeps_source_intact() {
        init_logger();
        let original = PackageDescriptor::from_json_str(
            r#"{"name_template": "MaaCore-{version}", "type": "Zip", "level": 9}"#,
        )
        .unwrap();

        let linux = original
            .with_name_template("MaaCore-{version}-linux")
            .with_package_type(PackageType::TarGz);

        assert_eq!(original.package_type(), PackageType::Zip);
        assert_eq!(
            linux.to_value(),
            json!({"name_template": "MaaCore-{version}-linux", "type": "TarGz", "level": 9})
        );
    }

    #[test]
    fn test_errors_are_surfaced_without_partial_result() {
        init_logger();
        let missing = PackageDescriptor::from_json_str(r#"{"name_template": "pkg"}"#);
        assert!(matches!(missing, Err(DescriptorError::MissingField("type"))));

        let unknown = PackageDescriptor::from_json_str(r#"{"name_template": "pkg", "type": "Msi"}"#)
            .unwrap_err();
        assert_eq!(
            unknown.to_string(),
            "Unknown package type 'Msi', expected one of: Bundle, Zip, TarGz, Copy"
        );
    }
}
