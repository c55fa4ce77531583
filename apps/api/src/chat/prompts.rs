use crate::llm_client::CompletionOptions;

pub const MEDICAL_OPTIONS: CompletionOptions = CompletionOptions {
    max_tokens: 500,
    temperature: 0.7,
    json_mode: false,
};

pub const GENERAL_OPTIONS: CompletionOptions = CompletionOptions {
    max_tokens: 300,
    temperature: 0.7,
    json_mode: false,
};

pub const MEDICAL_SYSTEM: &str = "You are a helpful medical information assistant. \
When users describe symptoms, provide: 1) Possible conditions that might cause these symptoms, \
2) Over-the-counter medications or pharmacy products that might help, \
3) When to seek immediate medical attention, 4) Important medical disclaimers.";

pub const MEDICAL_PROMPT_TEMPLATE: &str = "Symptoms described: {message}

Please provide:
- Possible medical conditions
- Pharmacy/OTC medication suggestions
- When to see a doctor
- Important disclaimers

Format the response clearly with sections.";

pub const GENERAL_SYSTEM: &str =
    "You are a helpful assistant. Provide clear and helpful responses to user questions.";

/// Sent when the model returns no content.
pub const EMPTY_COMPLETION_REPLY: &str = "Sorry, I couldn't generate a response.";
