// All LLM prompt constants for the contract workflow.
// Templates use `{name}` slots filled by `llm_client::prompts::fill_slots` before sending.

pub const CLASSIFY_SYSTEM: &str =
    "You are a legal expert specializing in contract classification.";

/// Replace: {proposal}
pub const CLASSIFY_PROMPT_TEMPLATE: &str = "Based on the following business proposal, \
what type of contract template would be most appropriate? \
Respond with only the contract type name, nothing else.

{proposal}

Contract type:";

pub const TEMPLATE_SYSTEM: &str = "You are a legal expert specializing in contract generation.";

/// Replace: {contract_type}, {plain_text_instruction}
pub const TEMPLATE_PROMPT_TEMPLATE: &str = "Generate a {contract_type} contract template. \
Include clearly marked placeholders in [Square Brackets] for every party-specific detail \
(names, dates, amounts, addresses, jurisdictions).

{plain_text_instruction}";

/// Population shares the generation persona.
pub const POPULATE_SYSTEM: &str = TEMPLATE_SYSTEM;

/// Replace: {template}, {proposal}, {plain_text_instruction}
pub const POPULATE_PROMPT_TEMPLATE: &str = "Given the following contract template and \
business proposal, fill in the template with the relevant information from the proposal. \
Leave a placeholder untouched when the proposal does not supply its value.

Template:
{template}

Proposal:
{proposal}

{plain_text_instruction}

Filled template:";

pub const RISK_SYSTEM: &str =
    "You are a legal expert specializing in risk assessment and compliance.";

/// Replace: {contract}
pub const RISK_PROMPT_TEMPLATE: &str = "Analyze the following contract for potential risks \
and compliance issues. Provide a detailed report.

{contract}

Risk and Compliance Report:";

pub const FINALIZE_SYSTEM: &str = "You are a legal expert specializing in contract finalization.";

/// Replace: {contract}, {plain_text_instruction}
pub const FINALIZE_PROMPT_TEMPLATE: &str = "Review and finalize the following contract, \
ensuring consistency and compliance:

{contract}

{plain_text_instruction}

Final Contract:";
