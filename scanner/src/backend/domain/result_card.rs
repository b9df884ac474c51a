use shared::{ResultCard, ResultValidity, ScanResult, ScanViewState};

pub const RESULT_CARD_TITLE: &str = "Scan Result";
pub const EMPTY_RESULT_PROMPT: &str = "Scan a QR code to see the result";

/// Formats the "Scan Result" card shown next to the scanner
#[derive(Debug, Clone, Default)]
pub struct ResultCardService;

impl ResultCardService {
    pub fn new() -> Self {
        Self
    }

    pub fn format_card(&self, result: Option<&ScanResult>) -> ResultCard {
        match result {
            Some(result) => {
                let (validity, headline) = if result.is_valid {
                    (ResultValidity::Valid, "Valid QR Code")
                } else {
                    (ResultValidity::Invalid, "Invalid QR Code")
                };
                ResultCard {
                    title: RESULT_CARD_TITLE.to_string(),
                    headline: headline.to_string(),
                    validity: Some(validity),
                    content: Some(result.payload.clone()),
                }
            }
            None => ResultCard {
                title: RESULT_CARD_TITLE.to_string(),
                headline: EMPTY_RESULT_PROMPT.to_string(),
                validity: None,
                content: None,
            },
        }
    }

    pub fn format_view(&self, state: &ScanViewState) -> ResultCard {
        self.format_card(state.result.as_ref())
    }

    /// Plain-text rendering for terminals and logs
    pub fn render_text(&self, card: &ResultCard) -> String {
        let mut lines = vec![card.title.clone()];
        let marker = match card.validity {
            Some(ResultValidity::Valid) => "✔ ",
            Some(ResultValidity::Invalid) => "✘ ",
            None => "",
        };
        lines.push(format!("{}{}", marker, card.headline));
        if let Some(content) = &card.content {
            lines.push(format!("Content: {}", content));
        }
        lines.join("\n")
    }
}
