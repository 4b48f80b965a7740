use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A model identifier accepted by the chat API.
///
/// This can be one of the models the assistant ships with or a custom string value
/// for models configured on the server that this client does not know about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Model {
    /// Known model.
    Known(KnownModel),

    /// Custom model identifier.
    Custom(String),
}

/// Models offered by the research assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownModel {
    /// Qwen Turbo.
    QwenTurbo,

    /// Qwen Plus.
    QwenPlus,

    /// Deepseek Coder.
    DeepseekCoder,

    /// Deepseek Chat.
    DeepseekChat,
}

impl KnownModel {
    /// Every known model, in the order a picker should list them.
    pub const ALL: [KnownModel; 4] = [
        KnownModel::QwenTurbo,
        KnownModel::QwenPlus,
        KnownModel::DeepseekCoder,
        KnownModel::DeepseekChat,
    ];

    /// The wire identifier.
    pub fn id(self) -> &'static str {
        match self {
            KnownModel::QwenTurbo => "qwen/qwen-turbo",
            KnownModel::QwenPlus => "qwen/qwen-plus",
            KnownModel::DeepseekCoder => "deepseek/deepseek-coder",
            KnownModel::DeepseekChat => "deepseek/deepseek-chat",
        }
    }

    /// A human-readable name.
    pub fn display_name(self) -> &'static str {
        match self {
            KnownModel::QwenTurbo => "Qwen Turbo",
            KnownModel::QwenPlus => "Qwen Plus",
            KnownModel::DeepseekCoder => "Deepseek Coder",
            KnownModel::DeepseekChat => "Deepseek Chat",
        }
    }
}

impl Model {
    /// A human-readable name; custom models display their identifier.
    pub fn display_name(&self) -> &str {
        match self {
            Model::Known(known) => known.display_name(),
            Model::Custom(custom) => custom,
        }
    }

    /// The wire identifier.
    pub fn id(&self) -> &str {
        match self {
            Model::Known(known) => known.id(),
            Model::Custom(custom) => custom,
        }
    }
}

impl Default for Model {
    fn default() -> Self {
        Model::Known(KnownModel::QwenTurbo)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl fmt::Display for KnownModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for KnownModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KnownModel::ALL
            .into_iter()
            .find(|known| known.id() == s)
            .ok_or_else(|| format!("unknown model: {s}"))
    }
}

impl FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Model::from(s))
    }
}

impl From<KnownModel> for Model {
    fn from(model: KnownModel) -> Self {
        Model::Known(model)
    }
}

impl From<String> for Model {
    fn from(model: String) -> Self {
        match model.parse::<KnownModel>() {
            Ok(known) => Model::Known(known),
            Err(_) => Model::Custom(model),
        }
    }
}

impl From<&str> for Model {
    fn from(model: &str) -> Self {
        Model::from(model.to_string())
    }
}

impl From<Model> for String {
    fn from(model: Model) -> Self {
        match model {
            Model::Known(known) => known.id().to_string(),
            Model::Custom(custom) => custom,
        }
    }
}
