//! Static catalog of the OpenAPI 3.0 object shapes.
//!
//! Every node in a document tree is one of four kinds: record, keyed map,
//! sequence, or scalar. Records are identified by [`Kind`] and carry a fixed,
//! ordered list of fields keyed by their external YAML name. Keys a record
//! schema does not declare are kept verbatim as extensions and never walked.

/// External key of the reference field.
pub const REF_KEY: &str = "$ref";

/// Opaque value.
const SCALAR: Shape = Shape::Scalar;
/// Sequence of opaque values.
const SCALARS: Shape = Shape::Sequence(&SCALAR);
/// Map of opaque values.
const SCALAR_MAP: Shape = Shape::Map(&SCALAR);

/// Callbacks by name.
const CALLBACK_MAP: Shape = Shape::Map(&Shape::Record(Kind::Callback));
/// Encodings by property name.
const ENCODING_MAP: Shape = Shape::Map(&Shape::Record(Kind::Encoding));
/// Examples by name.
const EXAMPLE_MAP: Shape = Shape::Map(&Shape::Record(Kind::Example));
/// Headers by name.
const HEADER_MAP: Shape = Shape::Map(&Shape::Record(Kind::Header));
/// Links by name.
const LINK_MAP: Shape = Shape::Map(&Shape::Record(Kind::Link));
/// Media types by content type.
const MEDIA_TYPE_MAP: Shape = Shape::Map(&Shape::Record(Kind::MediaType));
/// Parameters by name.
const PARAMETER_MAP: Shape = Shape::Map(&Shape::Record(Kind::Parameter));
/// Parameter list.
const PARAMETERS: Shape = Shape::Sequence(&Shape::Record(Kind::Parameter));
/// Path items by path template.
const PATH_ITEM_MAP: Shape = Shape::Map(&Shape::Record(Kind::PathItem));
/// Request bodies by name.
const REQUEST_BODY_MAP: Shape = Shape::Map(&Shape::Record(Kind::RequestBody));
/// Responses by status code or name.
const RESPONSE_MAP: Shape = Shape::Map(&Shape::Record(Kind::Response));
/// A nested schema.
const SCHEMA: Shape = Shape::Record(Kind::Schema);
/// Schemas by name.
const SCHEMA_MAP: Shape = Shape::Map(&SCHEMA);
/// Schema list.
const SCHEMAS: Shape = Shape::Sequence(&SCHEMA);
/// A nested schema or a boolean.
const SCHEMA_OR_FLAG: Shape = Shape::RecordOrScalar(Kind::Schema);
/// Scopes by security scheme name.
const SECURITY_REQUIREMENT: Shape = Shape::Map(&SCALARS);
/// Alternative security requirements.
const SECURITY_REQUIREMENTS: Shape = Shape::Sequence(&SECURITY_REQUIREMENT);
/// Security schemes by name.
const SECURITY_SCHEME_MAP: Shape = Shape::Map(&Shape::Record(Kind::SecurityScheme));
/// Server list.
const SERVERS: Shape = Shape::Sequence(&Shape::Record(Kind::Server));
/// Server variables by name.
const SERVER_VARIABLE_MAP: Shape = Shape::Map(&Shape::Record(Kind::ServerVariable));
/// Tag list.
const TAGS: Shape = Shape::Sequence(&Shape::Record(Kind::Tag));

/// The `externalDocs` field shared by several records.
const EXTERNAL_DOCS_FIELD: FieldSchema = field("externalDocs", Shape::Record(Kind::ExternalDocs));
/// An operation under an HTTP method key.
const OPERATION_FIELD: Shape = Shape::Record(Kind::Operation);

/// Fields of the document root.
static OPENAPI: RecordSchema = RecordSchema {
    fields: &[
        field("openapi", SCALAR),
        field("info", Shape::Record(Kind::Info)),
        field("servers", SERVERS),
        field("paths", PATH_ITEM_MAP),
        field("components", Shape::Record(Kind::Components)),
        field("security", SECURITY_REQUIREMENTS),
        field("tags", TAGS),
        EXTERNAL_DOCS_FIELD,
    ],
    name: "OpenAPI",
};

/// Fields of the info record.
static INFO: RecordSchema = RecordSchema {
    fields: &[
        field("title", SCALAR),
        field("description", SCALAR),
        field("termsOfService", SCALAR),
        field("contact", Shape::Record(Kind::Contact)),
        field("license", Shape::Record(Kind::License)),
        field("version", SCALAR),
    ],
    name: "Info",
};

/// Fields of the contact record.
static CONTACT: RecordSchema = RecordSchema {
    fields: &[field("name", SCALAR), field("url", SCALAR), field("email", SCALAR)],
    name: "Contact",
};

/// Fields of the license record.
static LICENSE: RecordSchema = RecordSchema {
    fields: &[field("name", SCALAR), field("url", SCALAR)],
    name: "License",
};

/// Fields of the server record.
static SERVER: RecordSchema = RecordSchema {
    fields: &[
        field("url", SCALAR),
        field("description", SCALAR),
        field("variables", SERVER_VARIABLE_MAP),
    ],
    name: "Server",
};

/// Fields of the server variable record.
static SERVER_VARIABLE: RecordSchema = RecordSchema {
    fields: &[field("enum", SCALARS), field("default", SCALAR), field("description", SCALAR)],
    name: "ServerVariable",
};

/// Fields of the components record.
static COMPONENTS: RecordSchema = RecordSchema {
    fields: &[
        field("schemas", SCHEMA_MAP),
        field("responses", RESPONSE_MAP),
        field("parameters", PARAMETER_MAP),
        field("examples", EXAMPLE_MAP),
        field("requestBodies", REQUEST_BODY_MAP),
        field("headers", HEADER_MAP),
        field("securitySchemes", SECURITY_SCHEME_MAP),
        field("links", LINK_MAP),
        field("callbacks", CALLBACK_MAP),
    ],
    name: "Components",
};

/// Fields of the path item record.
static PATH_ITEM: RecordSchema = RecordSchema {
    fields: &[
        field(REF_KEY, SCALAR),
        field("summary", SCALAR),
        field("description", SCALAR),
        field("get", OPERATION_FIELD),
        field("put", OPERATION_FIELD),
        field("post", OPERATION_FIELD),
        field("delete", OPERATION_FIELD),
        field("options", OPERATION_FIELD),
        field("head", OPERATION_FIELD),
        field("patch", OPERATION_FIELD),
        field("trace", OPERATION_FIELD),
        field("servers", SERVERS),
        field("parameters", PARAMETERS),
    ],
    name: "PathItem",
};

/// Fields of the operation record.
static OPERATION: RecordSchema = RecordSchema {
    fields: &[
        field("tags", SCALARS),
        field("summary", SCALAR),
        field("description", SCALAR),
        EXTERNAL_DOCS_FIELD,
        field("operationId", SCALAR),
        field("parameters", PARAMETERS),
        field("requestBody", Shape::Record(Kind::RequestBody)),
        field("responses", RESPONSE_MAP),
        field("callbacks", CALLBACK_MAP),
        field("deprecated", SCALAR),
        field("security", SECURITY_REQUIREMENTS),
        field("servers", SERVERS),
    ],
    name: "Operation",
};

/// Fields of the external docs record.
static EXTERNAL_DOCS: RecordSchema = RecordSchema {
    fields: &[field("description", SCALAR), field("url", SCALAR)],
    name: "ExternalDocumentation",
};

/// Fields of the parameter record.
static PARAMETER: RecordSchema = RecordSchema {
    fields: &[
        field(REF_KEY, SCALAR),
        field("name", SCALAR),
        field("in", SCALAR),
        field("description", SCALAR),
        field("required", SCALAR),
        field("deprecated", SCALAR),
        field("allowEmptyValue", SCALAR),
        field("style", SCALAR),
        field("explode", SCALAR),
        field("allowReserved", SCALAR),
        field("schema", SCHEMA),
        field("example", SCALAR),
        field("examples", EXAMPLE_MAP),
        field("content", MEDIA_TYPE_MAP),
    ],
    name: "Parameter",
};

/// Fields of the request body record.
static REQUEST_BODY: RecordSchema = RecordSchema {
    fields: &[
        field(REF_KEY, SCALAR),
        field("description", SCALAR),
        field("content", MEDIA_TYPE_MAP),
        field("required", SCALAR),
    ],
    name: "RequestBody",
};

/// Fields of the media type record.
static MEDIA_TYPE: RecordSchema = RecordSchema {
    fields: &[
        field(REF_KEY, SCALAR),
        field("schema", SCHEMA),
        field("example", SCALAR),
        field("examples", EXAMPLE_MAP),
        field("encoding", ENCODING_MAP),
    ],
    name: "MediaType",
};

/// Fields of the encoding record.
static ENCODING: RecordSchema = RecordSchema {
    fields: &[
        field("contentType", SCALAR),
        field("headers", HEADER_MAP),
        field("style", SCALAR),
        field("explode", SCALAR),
        field("allowReserved", SCALAR),
    ],
    name: "Encoding",
};

/// Fields of the response record.
static RESPONSE: RecordSchema = RecordSchema {
    fields: &[
        field(REF_KEY, SCALAR),
        field("description", SCALAR),
        field("headers", HEADER_MAP),
        field("content", MEDIA_TYPE_MAP),
        field("links", LINK_MAP),
    ],
    name: "Response",
};

/// Callback expressions are kept as extensions; only the reference is walked.
static CALLBACK: RecordSchema = RecordSchema {
    fields: &[field(REF_KEY, SCALAR)],
    name: "Callback",
};

/// Fields of the example record.
static EXAMPLE: RecordSchema = RecordSchema {
    fields: &[
        field(REF_KEY, SCALAR),
        field("summary", SCALAR),
        field("description", SCALAR),
        field("value", SCALAR),
        field("externalValue", SCALAR),
    ],
    name: "Example",
};

/// Fields of the link record.
static LINK: RecordSchema = RecordSchema {
    fields: &[
        field(REF_KEY, SCALAR),
        field("operationRef", SCALAR),
        field("operationId", SCALAR),
        field("parameters", SCALAR_MAP),
        field("requestBody", SCALAR),
        field("description", SCALAR),
        field("server", Shape::Record(Kind::Server)),
    ],
    name: "Link",
};

/// Fields of the header record.
static HEADER: RecordSchema = RecordSchema {
    fields: &[
        field(REF_KEY, SCALAR),
        field("description", SCALAR),
        field("required", SCALAR),
        field("deprecated", SCALAR),
        field("allowEmptyValue", SCALAR),
        field("style", SCALAR),
        field("explode", SCALAR),
        field("allowReserved", SCALAR),
        field("schema", SCHEMA),
        field("example", SCALAR),
        field("examples", EXAMPLE_MAP),
        field("content", MEDIA_TYPE_MAP),
    ],
    name: "Header",
};

/// Fields of the tag record.
static TAG: RecordSchema = RecordSchema {
    fields: &[field("name", SCALAR), field("description", SCALAR), EXTERNAL_DOCS_FIELD],
    name: "Tag",
};

/// Fields of the schema record. `additionalProperties` is either a nested
/// schema or a boolean.
static SCHEMA_OBJECT: RecordSchema = RecordSchema {
    fields: &[
        field(REF_KEY, SCALAR),
        field("title", SCALAR),
        field("description", SCALAR),
        field("type", SCALAR),
        field("format", SCALAR),
        field("nullable", SCALAR),
        field("discriminator", Shape::Record(Kind::Discriminator)),
        field("readOnly", SCALAR),
        field("writeOnly", SCALAR),
        field("xml", Shape::Record(Kind::Xml)),
        EXTERNAL_DOCS_FIELD,
        field("example", SCALAR),
        field("default", SCALAR),
        field("deprecated", SCALAR),
        field("multipleOf", SCALAR),
        field("maximum", SCALAR),
        field("exclusiveMaximum", SCALAR),
        field("minimum", SCALAR),
        field("exclusiveMinimum", SCALAR),
        field("maxLength", SCALAR),
        field("minLength", SCALAR),
        field("pattern", SCALAR),
        field("maxItems", SCALAR),
        field("minItems", SCALAR),
        field("uniqueItems", SCALAR),
        field("maxProperties", SCALAR),
        field("minProperties", SCALAR),
        field("required", SCALARS),
        field("enum", SCALARS),
        field("properties", SCHEMA_MAP),
        field("additionalProperties", SCHEMA_OR_FLAG),
        field("items", SCHEMA),
        field("allOf", SCHEMAS),
        field("oneOf", SCHEMAS),
        field("anyOf", SCHEMAS),
        field("not", SCHEMA),
    ],
    name: "Schema",
};

/// Fields of the discriminator record.
static DISCRIMINATOR: RecordSchema = RecordSchema {
    fields: &[field("propertyName", SCALAR), field("mapping", SCALAR_MAP)],
    name: "Discriminator",
};

/// Fields of the xml record.
static XML: RecordSchema = RecordSchema {
    fields: &[
        field("name", SCALAR),
        field("namespace", SCALAR),
        field("prefix", SCALAR),
        field("attribute", SCALAR),
        field("wrapped", SCALAR),
    ],
    name: "XML",
};

/// Fields of the security scheme record.
static SECURITY_SCHEME: RecordSchema = RecordSchema {
    fields: &[
        field(REF_KEY, SCALAR),
        field("type", SCALAR),
        field("description", SCALAR),
        field("name", SCALAR),
        field("in", SCALAR),
        field("scheme", SCALAR),
        field("bearerFormat", SCALAR),
        field("flows", Shape::Record(Kind::OAuthFlows)),
        field("openIdConnectUrl", SCALAR),
    ],
    name: "SecurityScheme",
};

/// Fields of the oauth flows record.
static OAUTH_FLOWS: RecordSchema = RecordSchema {
    fields: &[
        field("implicit", Shape::Record(Kind::OAuthFlow)),
        field("password", Shape::Record(Kind::OAuthFlow)),
        field("clientCredentials", Shape::Record(Kind::OAuthFlow)),
        field("authorizationCode", Shape::Record(Kind::OAuthFlow)),
    ],
    name: "OAuthFlows",
};

/// Fields of the oauth flow record.
static OAUTH_FLOW: RecordSchema = RecordSchema {
    fields: &[
        field("authorizationUrl", SCALAR),
        field("tokenUrl", SCALAR),
        field("refreshUrl", SCALAR),
        field("scopes", SCALAR_MAP),
    ],
    name: "OAuthFlow",
};

/// Declared shape of a value slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Keyed map of string keys to values of the given shape.
    Map(&'static Shape),
    /// Record with a fixed field catalog.
    Record(Kind),
    /// Record of the given kind when written as a mapping, any other YAML
    /// value otherwise (`additionalProperties: false`).
    RecordOrScalar(Kind),
    /// Any YAML value, kept opaque.
    Scalar,
    /// Ordered sequence of values of the given shape.
    Sequence(&'static Shape),
}

/// A declared record field.
#[derive(Debug)]
pub struct FieldSchema {
    /// External YAML key.
    pub key: &'static str,
    /// Declared shape of the value.
    pub shape: Shape,
}

/// Field catalog of one record kind, in schema order.
#[derive(Debug)]
pub struct RecordSchema {
    /// Declared fields in output order.
    pub fields: &'static [FieldSchema],
    /// Human-readable record name for diagnostics.
    pub name: &'static str,
}

impl RecordSchema {
    /// Index of the field declared under `key`.
    pub fn field_index(&self, key: &str) -> Option<usize> {
        return self.fields.iter().position(|f| return f.key == key);
    }

    /// Index of the `$ref` field, if this record can be a reference.
    pub fn reference_index(&self) -> Option<usize> {
        return self.field_index(REF_KEY);
    }
}

/// Record kinds of the OpenAPI 3.0 object model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Callback Object.
    Callback,
    /// Components Object.
    Components,
    /// Contact Object.
    Contact,
    /// Discriminator Object.
    Discriminator,
    /// Encoding Object.
    Encoding,
    /// Example Object.
    Example,
    /// External Documentation Object.
    ExternalDocs,
    /// Header Object.
    Header,
    /// Info Object.
    Info,
    /// License Object.
    License,
    /// Link Object.
    Link,
    /// Media Type Object.
    MediaType,
    /// OAuth Flow Object.
    OAuthFlow,
    /// OAuth Flows Object.
    OAuthFlows,
    /// Document root.
    OpenApi,
    /// Operation Object.
    Operation,
    /// Parameter Object.
    Parameter,
    /// Path Item Object.
    PathItem,
    /// Request Body Object.
    RequestBody,
    /// Response Object.
    Response,
    /// Schema Object.
    Schema,
    /// Security Scheme Object.
    SecurityScheme,
    /// Server Object.
    Server,
    /// Server Variable Object.
    ServerVariable,
    /// Tag Object.
    Tag,
    /// XML Object.
    Xml,
}

impl Kind {
    /// Field catalog for this record kind.
    pub fn schema(self) -> &'static RecordSchema {
        return match self {
            Kind::Callback => &CALLBACK,
            Kind::Components => &COMPONENTS,
            Kind::Contact => &CONTACT,
            Kind::Discriminator => &DISCRIMINATOR,
            Kind::Encoding => &ENCODING,
            Kind::Example => &EXAMPLE,
            Kind::ExternalDocs => &EXTERNAL_DOCS,
            Kind::Header => &HEADER,
            Kind::Info => &INFO,
            Kind::License => &LICENSE,
            Kind::Link => &LINK,
            Kind::MediaType => &MEDIA_TYPE,
            Kind::OAuthFlow => &OAUTH_FLOW,
            Kind::OAuthFlows => &OAUTH_FLOWS,
            Kind::OpenApi => &OPENAPI,
            Kind::Operation => &OPERATION,
            Kind::Parameter => &PARAMETER,
            Kind::PathItem => &PATH_ITEM,
            Kind::RequestBody => &REQUEST_BODY,
            Kind::Response => &RESPONSE,
            Kind::Schema => &SCHEMA_OBJECT,
            Kind::SecurityScheme => &SECURITY_SCHEME,
            Kind::Server => &SERVER,
            Kind::ServerVariable => &SERVER_VARIABLE,
            Kind::Tag => &TAG,
            Kind::Xml => &XML,
        };
    }
}

/// Declare a record field.
const fn field(key: &'static str, shape: Shape) -> FieldSchema {
    return FieldSchema { key, shape };
}
