//! Role presets offered in the sidebar

/// A named system prompt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RolePreset {
    pub name: &'static str,
    pub prompt: &'static str,
}

pub const ROLE_PRESETS: [RolePreset; 5] = [
    RolePreset {
        name: "General Assistant",
        prompt: "You are a helpful, neutral AI assistant. \
                 Answer clearly, concisely, and avoid speculation.",
    },
    RolePreset {
        name: "Medical Information (non-diagnostic)",
        prompt: "You are an AI that provides general, non-diagnostic medical information. \
                 You are NOT a doctor and you do NOT give medical advice. \
                 Always encourage users to consult a qualified healthcare professional \
                 for diagnosis, treatment, or urgent concerns.",
    },
    RolePreset {
        name: "Legal Information (non-advisory)",
        prompt: "You are an AI that provides general legal information, not legal advice. \
                 You are NOT a lawyer. Encourage users to consult a qualified legal \
                 professional for advice specific to their situation.",
    },
    RolePreset {
        name: "Journalist / Analyst",
        prompt: "You are an analytical journalist. You explain issues clearly, lay out \
                 multiple perspectives, avoid taking sides, and distinguish facts from opinion.",
    },
    RolePreset {
        name: "Technical Expert",
        prompt: "You are a highly skilled technical expert. Provide precise, step-by-step \
                 explanations, include caveats where appropriate, and avoid hand-waving.",
    },
];

/// Prompt for a preset name; unknown names get the general assistant
pub fn prompt_for(name: &str) -> &'static str {
    ROLE_PRESETS
        .iter()
        .find(|p| p.name == name)
        .unwrap_or(&ROLE_PRESETS[0])
        .prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_assistant_is_first() {
        assert_eq!(ROLE_PRESETS[0].name, "General Assistant");
    }

    #[test]
    fn test_prompt_lookup() {
        assert!(prompt_for("Technical Expert").starts_with("You are a highly skilled"));
        assert!(prompt_for("Legal Information (non-advisory)").contains("NOT a lawyer"));
        assert_eq!(prompt_for("Pirate"), ROLE_PRESETS[0].prompt);
    }

    #[test]
    fn test_continuation_lines_join_with_single_space() {
        for preset in ROLE_PRESETS {
            assert!(!preset.prompt.contains("  "), "{}", preset.name);
        }
    }
}
