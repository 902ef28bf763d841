//! Error types shared by the whole crate.
#![allow(deprecated)]

error_chain! {
    foreign_links {
        Io(::std::io::Error);
        Toml(::toml::de::Error);
        TomlSer(::toml::ser::Error);
        Json(::serde_json::Error);
        Cbor(::serde_cbor::Error);
        Bincode(::bincode::Error);
        MsgPackDecode(::rmp_serde::decode::Error);
        MsgPackEncode(::rmp_serde::encode::Error);
    }

    errors {
        // wrong component count, non-cubic grid or mismatching grid sizes
        MalformedField(msg: String) {
            description("malformed field")
            display("malformed field: {}", msg)
        }
        MissingField {
            description("missing field")
            display("snapshot must contain dataset `omega` or `u`")
        }
        InvalidConfig(msg: String) {
            description("invalid configuration")
            display("invalid configuration: {}", msg)
        }
        UnknownFormat(ext: String) {
            description("unknown container format")
            display("do not recognise file extension '{}'", ext)
        }
    }
}
