pub mod toml_config;

pub use toml_config::RequestConfig;

#[cfg(feature = "cli")]
use crate::utils::error::{PipelineError, Result};
#[cfg(feature = "cli")]
use crate::utils::redact::redact_url_str;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use std::fmt;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "oracle-etl")]
#[command(about = "Fetch a property record and encode it as an on-chain ABI payload")]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, value_enum, default_value = "compact")]
    pub log_format: LogFormat,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the request and print the payload, error and captured output
    Run(RunArgs),
    /// Decode a hex payload and print one value per line
    Decode {
        /// Payload, with or without 0x prefix
        hex: String,

        #[arg(long, default_value = crate::domain::model::PropertyRecord::SIGNATURE)]
        signature: String,
    },
}

#[cfg(feature = "cli")]
#[derive(Clone, Default, clap::Args)]
pub struct RunArgs {
    /// Path to TOML request configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override source.url (may contain {0}, {1}, … placeholders)
    #[arg(long)]
    pub url: Option<String>,

    /// Override source.args; repeat for each placeholder
    #[arg(long = "arg")]
    pub args: Vec<String>,

    #[arg(long)]
    pub timeout_ms: Option<u64>,

    #[arg(long)]
    pub max_bytes: Option<usize>,
}

// URL 可能帶 access token，輸出前先遮蔽
#[cfg(feature = "cli")]
impl fmt::Debug for RunArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunArgs")
            .field("config", &self.config)
            .field("url", &self.url.as_deref().map(redact_url_str))
            .field("args", &self.args)
            .field("timeout_ms", &self.timeout_ms)
            .field("max_bytes", &self.max_bytes)
            .finish()
    }
}

#[cfg(feature = "cli")]
impl RunArgs {
    /// 載入配置檔並套用命令列覆蓋設定
    pub fn resolve(&self) -> Result<RequestConfig> {
        let mut config = match (&self.config, &self.url) {
            (Some(path), _) => RequestConfig::from_file(path)?,
            (None, Some(url)) => RequestConfig::from_url(url.clone()),
            (None, None) => {
                return Err(PipelineError::MissingConfigError {
                    field: "--config or --url".to_string(),
                })
            }
        };

        if let Some(url) = &self.url {
            config.source.url = url.clone();
            tracing::info!("🔧 source.url overridden from command line");
        }
        if !self.args.is_empty() {
            config.source.args = Some(self.args.clone());
            tracing::info!("🔧 source.args overridden: {:?}", self.args);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.source.timeout_ms = Some(timeout_ms);
            tracing::info!("🔧 source.timeout_ms overridden to: {}", timeout_ms);
        }
        if let Some(max_bytes) = self.max_bytes {
            config
                .response
                .get_or_insert(toml_config::ResponseConfig { max_bytes: None })
                .max_bytes = Some(max_bytes);
            tracing::info!("🔧 response.max_bytes overridden to: {}", max_bytes);
        }

        Ok(config)
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_run_command() {
        let cli = CliConfig::parse_from([
            "oracle-etl",
            "run",
            "--url",
            "https://api.example.com/{0}",
            "--arg",
            "P_1",
            "--timeout-ms",
            "1500",
            "--verbose",
        ]);

        assert!(cli.verbose);
        assert_eq!(cli.log_format, LogFormat::Compact);
        match cli.command {
            Command::Run(args) => {
                let config = args.resolve().unwrap();
                assert_eq!(config.source.url, "https://api.example.com/{0}");
                assert_eq!(config.args(), &["P_1".to_string()]);
                assert_eq!(config.timeout_ms(), 1500);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_decode_command_default_signature() {
        let cli = CliConfig::parse_from(["oracle-etl", "decode", "0x00", "--log-format", "json"]);

        assert_eq!(cli.log_format, LogFormat::Json);
        match cli.command {
            Command::Decode { hex, signature } => {
                assert_eq!(hex, "0x00");
                assert_eq!(signature, "(string,uint256,uint256)");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_debug_output_masks_url_token() {
        let cli = CliConfig::parse_from([
            "oracle-etl",
            "--verbose",
            "run",
            "--url",
            "http://127.0.0.1:9/Property?access_token=SECRET_TOKEN_123&$select=YearBuilt",
        ]);

        let rendered = format!("{:?}", cli.command);

        assert!(!rendered.contains("SECRET_TOKEN_123"), "{}", rendered);
        assert!(rendered.contains("access_token=***"));
        assert!(rendered.contains("YearBuilt"));
    }

    #[test]
    fn test_run_args_require_source() {
        let err = RunArgs::default().resolve().unwrap_err();
        assert!(matches!(err, PipelineError::MissingConfigError { .. }));
    }

    #[test]
    fn test_run_args_override_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(
                br#"
[request]
name = "file"

[source]
url = "https://api.example.com/p"
timeout_ms = 2000
"#,
            )
            .unwrap();

        let args = RunArgs {
            config: Some(temp_file.path().to_string_lossy().into_owned()),
            max_bytes: Some(1024),
            ..RunArgs::default()
        };
        let config = args.resolve().unwrap();

        assert_eq!(config.request.name, "file");
        assert_eq!(config.timeout_ms(), 2000);
        assert_eq!(config.max_response_bytes(), 1024);
    }
}
