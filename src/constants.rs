// API Constants
pub const DEFAULT_API_BASE: &str = "https://0504ankitsharma-ikarus.hf.space";
pub const API_DOCS_URL: &str = "https://0504ankitsharma-ikarus.hf.space/docs";

// Conversation Constants
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant recommending furniture.";
pub const PENDING_REPLY_TEXT: &str =
    "⏳ Please wait a minute while I find the best recommendations for you...";
pub const QUICK_ASK_WINDOW: usize = 4;

pub const QUICK_ASKS: [&str; 20] = [
    "Show me some affordable storage racks for my room.",
    "Recommend some modern dining chairs for my home.",
    "I need waterproof gardening mats or tools.",
    "Suggest decorative outdoor doormats for my patio.",
    "Show me foldable TV trays or compact furniture.",
    "Find me metal organizers or racks under $30.",
    "Recommend products made of iron or metal for home use.",
    "Show me items available in white or grey color.",
    "Suggest home and kitchen furniture within a reasonable price range.",
    "I’m looking for multi-purpose furniture for small apartments.",
    "Find eco-friendly or polyethylene material products.",
    "Show me top brands like GOYMFK, Subrtex, or MUYETOL.",
    "Recommend outdoor décor items for my garden.",
    "I want compact furniture for dining or living rooms.",
    "Find rubber-based doormats or floor covers.",
    "Show me trending furniture items from China manufacturers.",
    "Suggest space-saving storage items for organizing shoes and clothes.",
    "Find foldable or portable home accessories.",
    "Recommend stylish dining furniture for 2–4 people.",
    "Show me garden accessories under $10.",
];

// Rendering Constants
pub const BUBBLE_WIDTH: usize = 72;
pub const CARD_CATEGORY_LIMIT: usize = 3;
pub const FREQUENCY_TABLE_LIMIT: usize = 10;
pub const SAMPLE_PRODUCT_ROWS: usize = 25;
