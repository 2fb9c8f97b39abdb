/// Field holding the package name template
pub const NAME_TEMPLATE_FIELD: &str = "name_template";
/// Field holding the package type name
pub const PACKAGE_TYPE_FIELD: &str = "type";
/// Fields that are decoded into dedicated descriptor fields and never land in the configuration bag
pub const RESERVED_FIELDS: [&str; 2] = [NAME_TEMPLATE_FIELD, PACKAGE_TYPE_FIELD];

pub const CONFIG_FILE_NAME: &str = "maa-packages.json";
