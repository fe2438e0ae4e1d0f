/// A named preset binding a backend model identifier to a fixed system
/// instruction. Assistants are static: selecting one only stores its id
/// on the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assistant {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub model: String,
    pub system_instruction: Option<String>,
}

/// The fixed catalog known at startup.
#[derive(Debug, Clone)]
pub struct AssistantCatalog {
    assistants: Vec<Assistant>,
}

impl AssistantCatalog {
    pub fn builtin() -> Self {
        Self {
            assistants: vec![
                Assistant {
                    id: "nano-banana".into(),
                    name: "Nano Banana".into(),
                    icon: "🍌".into(),
                    model: "gemini-2.5-flash-image".into(),
                    system_instruction: Some(
                        "You are an expert AI image generator. Your task is to generate images \
                         based on the user's prompt. You must NOT return JSON, code, or text \
                         descriptions of the image. You must ONLY return the generated image \
                         itself. If the user provides an image, use it as a reference for editing."
                            .into(),
                    ),
                },
                Assistant {
                    id: "nano-banana-pro".into(),
                    name: "Nano Banana Pro".into(),
                    icon: "🍌⁺".into(),
                    model: "gemini-3-pro-image-preview".into(),
                    system_instruction: Some(
                        "You are a high-fidelity AI image generator. Your task is to generate \
                         high-quality, photorealistic or stylized images. You must NOT return \
                         JSON, code, or text descriptions. You must ONLY return the generated \
                         image. If the user provides an image, use it as a reference."
                            .into(),
                    ),
                },
                Assistant {
                    id: "gemini-3-pro".into(),
                    name: "Gemini 3.0 Pro".into(),
                    icon: "🧠".into(),
                    model: "gemini-3-pro-preview".into(),
                    system_instruction: Some(
                        "You are a helpful and intelligent AI assistant capable of complex \
                         reasoning and text processing. Answer the user's questions \
                         comprehensively."
                            .into(),
                    ),
                },
            ],
        }
    }

    pub fn all(&self) -> &[Assistant] {
        &self.assistants
    }

    /// Look up an assistant by id, falling back to the first entry when
    /// the id is unknown (sessions persisted by older builds may point
    /// at presets that no longer exist).
    pub fn get(&self, id: &str) -> &Assistant {
        self.assistants
            .iter()
            .find(|a| a.id == id)
            .unwrap_or(&self.assistants[0])
    }

    pub fn default_assistant(&self) -> &Assistant {
        &self.assistants[0]
    }
}

impl Default for AssistantCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_id_falls_back_to_first() {
        let catalog = AssistantCatalog::builtin();
        assert_eq!(catalog.get("nano-banana-pro").id, "nano-banana-pro");
        assert_eq!(catalog.get("deleted-preset").id, catalog.default_assistant().id);
    }
}
