use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone, PartialEq, Eq)]
#[command(name = "persona_chat")]
#[command(
    about = "HTTP chat service that answers through named agent personalities",
    long_about = "HTTP chat service that answers through named agent personalities\n\nConfig file loading:\n  - --config <path> (explicit file, overrides default path discovery)\n  - Default probe path when --config is not provided:\n    1. $XDG_CONFIG_HOME/persona_chat/config.toml\n    2. ~/.config/persona_chat/config.toml"
)]
pub struct CliArgs {
    /// Load config from this file path instead of the default discovery path.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Address to bind, overriding the configured host.
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind, overriding the configured port.
    #[arg(long)]
    pub port: Option<u16>,

    /// Log outbound provider traffic (secrets redacted).
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::CliArgs;
    use clap::Parser;

    #[test]
    fn parse_defaults() {
        let args = CliArgs::try_parse_from(["persona_chat"]).expect("should parse");
        assert_eq!(args.config, None);
        assert_eq!(args.host, None);
        assert_eq!(args.port, None);
        assert!(!args.verbose);
    }

    #[test]
    fn parse_config_flag() {
        let args = CliArgs::try_parse_from(["persona_chat", "--config", "/tmp/custom.toml"])
            .expect("parse");
        assert_eq!(
            args.config.as_deref(),
            Some(std::path::Path::new("/tmp/custom.toml"))
        );
    }

    #[test]
    fn parse_bind_overrides_and_verbose() {
        let args = CliArgs::try_parse_from([
            "persona_chat",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
            "-v",
        ])
        .expect("parse");
        assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(args.port, Some(8080));
        assert!(args.verbose);
    }

    #[test]
    fn parse_rejects_invalid_port() {
        assert!(CliArgs::try_parse_from(["persona_chat", "--port", "99999"]).is_err());
    }
}
