// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Disclaimer every medical answer must carry, whatever its format.
pub const MEDICAL_DISCLAIMER_INSTRUCTION: &str = "\
    Always emphasize that this is general information, not a medical diagnosis, \
    and that the user should consult a qualified healthcare professional.";

/// Substituted for optional patient fields the user left blank.
pub const NOT_SPECIFIED: &str = "Not specified";
