pub const OPENAI_API_URL: &str = "https://api.openai.com/v1";
pub const OPENAI_MODEL: &str = "gpt-4o";

pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com";
pub const ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const ANTHROPIC_MAX_TOKENS: u32 = 1000;

pub const SEARCH_API_URL: &str = "https://www.searchapi.io/api/v1/search";
pub const SEARCH_ENGINE: &str = "google";

pub const EUTILS_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
pub const PUBMED_SEARCH_BATCH: usize = 500;
pub const PUBMED_FETCH_BATCH: usize = 200;
pub const PUBMED_DELAY_MS: u64 = 300;
pub const PUBMED_RETRIES: u32 = 3;
pub const PUBMED_BACKOFF_SECS: f64 = 0.5;

pub const PMC_ARTICLES_URL: &str = "https://www.ncbi.nlm.nih.gov/pmc/articles";
pub const PMC_OA_LIST_URL: &str = "https://ftp.ncbi.nlm.nih.gov/pub/pmc/oa_non_comm_use_pdf.csv";
pub const PMC_OA_LIST_FILE: &str = "oa_non_comm_use_pdf.csv";
pub const PMC_DELAY_MS: u64 = 200;
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/86.0.4240.183 Safari/537.36";

pub const MISSING_PMIDS_FILE: &str = "missing_pmids.txt";
pub const STILL_MISSING_PMIDS_FILE: &str = "still_missing_pmids.txt";

pub const ASSISTANT_AUTHOR: &str = "Assistant";
pub const DEFAULT_MAX_TOOL_ROUNDS: u32 = 1;

pub const CONNECT_TIMEOUT_SECS: u64 = 30;
pub const READ_TIMEOUT_SECS: u64 = 60;
pub const CHANNEL_BUFFER_SIZE: usize = 100;
pub const SERVER_HOST: &str = "127.0.0.1";
pub const SERVER_PORT: u16 = 8000;

pub const CONFIG_FILE_ENV: &str = "SLR_CONFIG_FILE";
pub const DEFAULT_CONFIG_FILE: &str = "./slr_config.json";
