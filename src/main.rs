use clap::Parser;
use site_prompt::analysis::BusinessAnalyst;
use site_prompt::error::TemplateError;
use site_prompt::llm::{ChatClient, OpenAiClient};
use site_prompt::template::{self, DEFAULT_TEMPLATE_PATH};
use site_prompt::{AppConfig, BusinessRecord, Pipeline, PipelineError};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        ::log::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = load_config(&args)?;

    println!("Note: crawling requires a WebDriver server (e.g., ChromeDriver).");
    println!("Using WebDriver at {}", config.crawler.webdriver_url);

    let openai = OpenAiClient::new(&config.llm)?;
    ::log::info!("Using model {}", openai.model());
    let client: Arc<dyn ChatClient> = Arc::new(openai);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ::log::warn!("Interrupted, stopping");
            on_interrupt.cancel();
        }
    });

    let start_time = std::time::Instant::now();
    let pipeline = Pipeline::new(config.crawler.clone(), client.clone());
    let output = pipeline.run(&args.url, &cancel).await.map_err(|e| match e {
        PipelineError::Browser(reason) => Box::<dyn Error>::from(format!(
            "could not start a browser session ({}); is a WebDriver server running at {}?",
            reason, config.crawler.webdriver_url
        )),
        other => Box::<dyn Error>::from(other),
    })?;
    ::log::info!(
        "Crawled {} pages and extracted {} fields in {:.2} seconds",
        output.report.pages_fetched,
        output.record.available_count(),
        start_time.elapsed().as_secs_f64()
    );

    print_summary(&output.record);

    let document = match render_document(&args, &output.record)? {
        Some(document) => {
            std::fs::write(&args.output, &document)?;
            println!("\nFinal prompt written to {}", args.output.display());
            println!("\n{}", document);
            document
        }
        None => {
            let json = serde_json::to_string_pretty(&output.record)?;
            println!("\n{}", json);
            json
        }
    };

    if args.analyze {
        let analyst = BusinessAnalyst::new(client);
        match analyst
            .analyze(&document, output.record.value("company_name"))
            .await
        {
            Ok(report) => {
                let path = args
                    .analysis_output
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(report.download_name()));
                std::fs::write(&path, report.render())?;
                println!("\n{}", report.analysis);
                println!("\nAnalysis report written to {}", path.display());
            }
            // The prompt document is already saved
            Err(e) => ::log::error!("Business analysis failed: {}", e),
        }
    }

    Ok(())
}

/// Config file (or defaults), then environment, then command-line flags
fn load_config(args: &Args) -> Result<AppConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    config.apply_env();

    if let Some(pages) = args.pages {
        config.crawler.page_budget = usize::from(pages);
    }
    if let Some(url) = &args.webdriver_url {
        config.crawler.webdriver_url = url.clone();
    }
    if let Some(model) = &args.model {
        config.llm.model = model.clone();
    }

    config.validate()?;
    Ok(config)
}

/// Fill the prompt template. `None` when no template was asked for and the
/// default one does not exist.
fn render_document(args: &Args, record: &BusinessRecord) -> Result<Option<String>, TemplateError> {
    let path = args
        .template
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMPLATE_PATH));

    match template::load_template(&path) {
        Ok(text) => Ok(Some(template::render(&text, record))),
        Err(TemplateError::Missing(_)) if args.template.is_none() => {
            ::log::info!("No {} found, printing the record as JSON", DEFAULT_TEMPLATE_PATH);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn print_summary(record: &BusinessRecord) {
    let services = if record.is_available("services_list") {
        record
            .value("services_list")
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .count()
    } else {
        0
    };
    let socials = ["facebook_url", "instagram_url", "linkedin_url"]
        .iter()
        .filter(|f| record.is_available(f))
        .count();

    println!("\nExtracted data summary");
    println!("  Company:  {}", record.value("company_name"));
    println!("  Address:  {}", record.value("address"));
    println!("  Phone:    {}", record.value("phone_number"));
    println!("  Email:    {}", record.value("email"));
    println!("  Services: {} found", services);
    println!("  Pricing:  {}", record.value("pricing"));
    println!("  Social:   {} platforms found", socials);
}
