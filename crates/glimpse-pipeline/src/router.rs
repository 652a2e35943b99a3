use glimpse_config::prompts::PromptTemplate;
use glimpse_types::RoutePath;

/// Routing is a pure function of the model's capability and the
/// template's demand. A multimodal model takes the capture directly
/// unless the template insists on extracted text.
pub fn route(multimodal: bool, template: &PromptTemplate) -> RoutePath {
    if multimodal && !template.requires_ocr {
        RoutePath::DirectMultimodal
    } else {
        RoutePath::OcrThenText
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(requires_ocr: bool) -> PromptTemplate {
        PromptTemplate {
            name: "t".to_string(),
            body: "body".to_string(),
            requires_ocr,
        }
    }

    #[test]
    fn test_route_truth_table() {
        assert_eq!(route(true, &template(false)), RoutePath::DirectMultimodal);
        assert_eq!(route(true, &template(true)), RoutePath::OcrThenText);
        assert_eq!(route(false, &template(false)), RoutePath::OcrThenText);
        assert_eq!(route(false, &template(true)), RoutePath::OcrThenText);
    }
}
