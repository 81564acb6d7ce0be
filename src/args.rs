use clap::Parser;
use site_prompt::template::DEFAULT_OUTPUT_PATH;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "site-prompt")]
#[command(about = "Crawl a business website and generate an assistant prompt from it")]
#[command(version)]
pub struct Args {
    /// Business website to crawl (scheme optional)
    pub url: String,

    /// Maximum number of pages to fetch
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(3..=15))]
    pub pages: Option<u16>,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Prompt template to fill in (defaults to prompt_template.txt when present)
    #[arg(short, long)]
    pub template: Option<PathBuf>,

    /// Where to write the filled-in prompt
    #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
    pub output: PathBuf,

    /// Also ask the model for a business analysis of the generated prompt
    #[arg(long)]
    pub analyze: bool,

    /// Where to write the analysis report (defaults to <company>_analysis.txt)
    #[arg(long, requires = "analyze")]
    pub analysis_output: Option<PathBuf>,

    /// WebDriver server URL (overrides config and WEBDRIVER_URL)
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Chat model name (overrides config and OPENAI_MODEL)
    #[arg(long)]
    pub model: Option<String>,
}
