// src/scripts/templates.rs
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::BTreeMap;

/// Returned whenever the language model cannot produce a script
pub const DEFAULT_SCRIPT: &str = r#"Greeting: "Hello! This is an AI assistant calling from our service. How are you doing today?"

Main Flow:
- Listen to customer response
- Engage naturally based on their mood and response
- Ask relevant questions based on call purpose
- Provide helpful information
- Handle any concerns professionally

Closing: "Thank you for your time today. Is there anything else I can help you with before we end the call?""#;

/// Purposes offered by the dashboard; "Custom" lets the operator type one
pub const CALL_PURPOSES: [&str; 8] = [
    "Customer Service",
    "Sales Outreach",
    "Survey/Feedback",
    "Appointment Scheduling",
    "Lead Qualification",
    "Information Gathering",
    "Follow-up Call",
    "Custom",
];

#[derive(Debug, Clone, Serialize)]
pub struct ScriptTemplate {
    pub name: &'static str,
    pub script: &'static str,
}

pub static TEMPLATES: Lazy<BTreeMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut templates = BTreeMap::new();

    templates.insert(
        "Customer Service",
        r#"Greeting: "Hello! I'm calling from customer service to follow up on your recent inquiry. How are you doing today?"

Purpose: Address customer concerns and provide assistance

Flow:
1. Confirm customer identity politely
2. Reference their specific inquiry/issue
3. Provide helpful solutions or information
4. Ask if they have any other questions
5. Ensure customer satisfaction before ending

Closing: "Thank you for being a valued customer. Have a great day!""#,
    );

    templates.insert(
        "Sales Outreach",
        r#"Greeting: "Hi! This is [Name] calling about an exciting opportunity that might interest you. Do you have a quick moment to chat?"

Purpose: Introduce product/service and gauge interest

Flow:
1. Brief, friendly introduction
2. Mention the value proposition
3. Ask qualifying questions
4. Handle objections professionally
5. Suggest next steps (demo, meeting, etc.)

Closing: "Thanks for your time. I'll follow up with the information we discussed.""#,
    );

    templates.insert(
        "Survey/Feedback",
        r#"Greeting: "Hello! I'm conducting a brief survey to help us improve our services. Would you mind sharing your thoughts? It'll just take a few minutes."

Purpose: Gather customer feedback and insights

Flow:
1. Explain the purpose and duration
2. Ask permission to proceed
3. Ask structured questions
4. Listen actively to responses
5. Thank them for their valuable input

Closing: "Your feedback is very important to us. Thank you so much for your time!""#,
    );

    templates
});

pub fn list_templates() -> Vec<ScriptTemplate> {
    TEMPLATES
        .iter()
        .map(|(name, script)| ScriptTemplate { name: *name, script: *script })
        .collect()
}

pub fn template(name: &str) -> Option<&'static str> {
    TEMPLATES.get(name).copied()
}
