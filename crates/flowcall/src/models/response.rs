use serde::{Deserialize, Serialize};

/// One event of a streamed response: `{"choices":[{"delta":{"content":"..."}}]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamChunk {
    pub choices: Vec<DeltaChoice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaChoice {
    pub delta: Delta,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta {
    // terminal chunks may carry `"delta": {}`
    #[serde(default)]
    pub content: String,
}

/// The one-shot response: `{"choices":[{"message":{"content":"..."}}]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowResponse {
    pub choices: Vec<MessageChoice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageChoice {
    pub message: FinalMessage,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalMessage {
    #[serde(default)]
    pub content: String,
}
