use clap::Parser;
use oracle_etl::abi;
use oracle_etl::config::{Command, LogFormat, RunArgs};
use oracle_etl::utils::error::{ErrorSeverity, PipelineError};
use oracle_etl::utils::{logger, validation::Validate};
use oracle_etl::{CliConfig, PropertyPipeline, RequestEngine, RunOutcome};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    match cli.log_format {
        LogFormat::Compact => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(cli.verbose),
    }

    tracing::info!("Starting oracle-etl CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli.command);
    }

    let result = match &cli.command {
        Command::Run(args) => run(args).await,
        Command::Decode { hex, signature } => decode(hex, signature),
    };

    if let Err(e) = result {
        // 記錄詳細錯誤信息
        tracing::error!(
            "❌ {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(exit_code(&e));
    }
}

async fn run(args: &RunArgs) -> Result<(), PipelineError> {
    let config = args.resolve()?;

    // 驗證配置
    config.validate()?;
    tracing::info!("✅ Configuration for '{}' validated", config.request.name);

    let max_response_bytes = config.max_response_bytes();
    let pipeline = PropertyPipeline::new(config);
    let engine = RequestEngine::with_max_response_bytes(pipeline, max_response_bytes);

    let (result, console) = engine.execute().await;
    let outcome = RunOutcome::from_result(&result, &console);

    // 依序輸出 payload、錯誤、擷取的輸出
    println!("{}", outcome.response_bytes_hexstring.as_deref().unwrap_or(""));
    println!("{}", outcome.error_string.as_deref().unwrap_or(""));
    print!("{}", outcome.captured_terminal_output);

    result?;
    tracing::info!("✅ Request completed successfully!");
    Ok(())
}

fn decode(hex_payload: &str, signature: &str) -> Result<(), PipelineError> {
    let params = abi::parse_signature(signature)?;
    tracing::info!("🔍 Decoding payload as {}", abi::signature_string(&params));
    let tokens = abi::decode_hex(&params, hex_payload)?;

    for (param, token) in params.iter().zip(&tokens) {
        println!("{}: {}", param, token);
    }
    Ok(())
}

fn exit_code(e: &PipelineError) -> i32 {
    // 根據錯誤嚴重程度決定退出碼
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2, // 可重試的錯誤
        ErrorSeverity::High => 1,   // 處理錯誤
        ErrorSeverity::Critical => 3, // 系統錯誤
    }
}
