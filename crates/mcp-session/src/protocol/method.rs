//! The fixed table of methods the session understands.

/// One variant per inbound method kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Initialize,
    Initialized,
    Cancelled,
    ResourcesList,
    ResourcesRead,
    ToolsList,
    ToolsCall,
    PromptsList,
    PromptsGet,
}

const METHOD_TABLE: &[(&str, Method)] = &[
    ("initialize", Method::Initialize),
    ("initialized", Method::Initialized),
    ("notifications/initialized", Method::Initialized),
    ("notifications/cancelled", Method::Cancelled),
    ("resources/list", Method::ResourcesList),
    ("resources/read", Method::ResourcesRead),
    ("tools/list", Method::ToolsList),
    ("tools/call", Method::ToolsCall),
    ("prompts/list", Method::PromptsList),
    ("prompts/get", Method::PromptsGet),
];

impl Method {
    pub fn from_name(name: &str) -> Option<Self> {
        METHOD_TABLE
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, m)| *m)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Initialize => "initialize",
            Method::Initialized => "initialized",
            Method::Cancelled => "notifications/cancelled",
            Method::ResourcesList => "resources/list",
            Method::ResourcesRead => "resources/read",
            Method::ToolsList => "tools/list",
            Method::ToolsCall => "tools/call",
            Method::PromptsList => "prompts/list",
            Method::PromptsGet => "prompts/get",
        }
    }

    /// Methods the peer sends as notifications; they never need an answer.
    pub fn is_notification(self) -> bool {
        matches!(self, Method::Initialized | Method::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_round_trips() {
        for (name, method) in METHOD_TABLE {
            assert_eq!(Method::from_name(name), Some(*method));
            assert_eq!(Method::from_name(method.as_str()), Some(*method));
        }
        assert_eq!(Method::from_name("resources/subscribe"), None);
    }
}
