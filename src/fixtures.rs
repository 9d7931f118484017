#[cfg(test)]
pub mod test {
    use std::collections::HashMap;

    use serde::{Deserialize, Serialize};

    use crate::Flags;

    #[derive(Flags, Serialize, Deserialize, Debug, Clone, PartialEq)]
    pub struct ServeArgs {
        #[flag = "host,Address to bind"]
        pub host: String,

        #[flag = "port, Port to listen on"]
        pub port: u16,

        #[flag = "ratio,Sampling ratio, between 0 and 1"]
        pub ratio: f64,

        #[flag = "verbose"]
        pub verbose: bool,

        #[flag = "tags,Tags attached to every request"]
        pub tags: Vec<String>,

        #[flag = "ids,Numeric ids to serve"]
        pub ids: Vec<i64>,

        pub internal: String,
    }

    impl Default for ServeArgs {
        fn default() -> Self {
            Self {
                host: "localhost".into(),
                port: 8080,
                ratio: 0.5,
                verbose: false,
                tags: vec![],
                ids: vec![],
                internal: "kept".into(),
            }
        }
    }

    #[derive(Flags, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
    pub struct PortArgs {
        #[flag = "port,p"]
        pub port: i32,
    }

    #[derive(Flags, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
    pub struct HostArgs {
        #[flag = "host, do host stuff"]
        pub host: String,
    }

    #[derive(Flags, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
    pub struct DbArgs {
        #[flag = "port,Set port number for database"]
        pub port: i64,

        #[flag = "url,Set url for database connection"]
        pub url: String,

        #[flag = "enable-https,Enable automatic https"]
        pub enable_https: bool,
    }

    #[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
    pub struct Inner {
        pub value: i64,
    }

    #[derive(Flags, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
    pub struct NestedArgs {
        #[flag = "name"]
        pub name: String,

        #[flag = "inner,A nested struct"]
        pub inner: Inner,
    }

    #[derive(Flags, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
    pub struct MapArgs {
        #[flag = "labels"]
        pub labels: HashMap<String, String>,
    }

    #[derive(Flags, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
    pub struct OptionArgs {
        #[flag = "token"]
        pub token: Option<String>,
    }

    /// An unannotated nested struct is fine: it is never turned into a flag.
    #[derive(Flags, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
    pub struct UntaggedNestedArgs {
        #[flag = "name"]
        pub name: String,

        pub inner: Inner,
    }

    #[derive(Flags, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
    pub struct MalformedArgs {
        #[flag = "  ,help without a name"]
        pub broken: String,
    }

    /// The malformed tag comes first, so it is the error reported.
    #[derive(Flags, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
    pub struct MalformedThenUnsupportedArgs {
        #[flag = ""]
        pub first: String,

        #[flag = "labels"]
        pub labels: HashMap<String, String>,
    }

    #[derive(Flags, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
    pub struct DuplicateArgs {
        #[flag = "name,The first name"]
        pub first: String,

        #[flag = "name,The second name"]
        pub second: String,
    }

    #[derive(Flags, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
    pub struct HelpArgs {
        #[flag = "help,Shadows the built-in help flag"]
        pub help: bool,
    }

    #[derive(Flags, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
    pub struct ConfigFieldArgs {
        #[flag = "config,Where the config lives"]
        pub config: String,

        #[flag = "port"]
        pub port: i64,
    }

    #[derive(Flags, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
    pub struct NumericConfigArgs {
        #[flag = "config"]
        pub config: i64,
    }

    #[derive(Flags, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
    pub struct LimitArgs {
        #[flag = "name"]
        pub name: String,

        #[flag = "limit,Upper bound on rows returned"]
        pub limit: u64,
    }

    #[test]
    fn serve_args_defaults() {
        let args = ServeArgs::default();
        assert_eq!(args.host, "localhost");
        assert_eq!(args.port, 8080);
        assert!(!args.verbose);
        assert_eq!(args.internal, "kept");
    }
}
