//! Display labels and feedback phrases
//!
//! Static tables from internal type/location codes to display strings in each
//! supported language. Codes without an entry are shown as-is.

use crate::core::types::Language;

/// (code, zh, en)
const TYPE_LABELS: &[(&str, &str, &str)] = &[
    ("light", "灯", "light"),
    ("ac", "空调", "air conditioner"),
    ("air_conditioner", "空调", "air conditioner"),
    ("curtain", "窗帘", "curtain"),
    ("tv", "电视", "TV"),
    ("humidifier", "加湿器", "humidifier"),
    ("fan", "风扇", "fan"),
    ("sensor", "传感器", "sensor"),
];

/// (code, zh, en)
const LOCATION_LABELS: &[(&str, &str, &str)] = &[
    ("living_room", "客厅", "living room"),
    ("bedroom", "卧室", "bedroom"),
    ("master_bedroom", "主卧", "master bedroom"),
    ("second_bedroom", "次卧", "second bedroom"),
    ("kitchen", "厨房", "kitchen"),
    ("bathroom", "浴室", "bathroom"),
    ("balcony", "阳台", "balcony"),
    ("study", "书房", "study"),
    ("dining_room", "餐厅", "dining room"),
];

/// Status phrase chosen from the action that was carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPhrase {
    TurnedOn,
    TurnedOff,
    Adjusted,
}

/// Localized label and phrase lookup for one language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Labels {
    pub language: Language,
}

impl Labels {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    /// Display name for a device type code
    pub fn device_type(&self, code: &str) -> String {
        self.lookup(TYPE_LABELS, code)
    }

    /// Display name for a location code
    pub fn location(&self, code: &str) -> String {
        self.lookup(LOCATION_LABELS, code)
    }

    pub fn all_areas(&self) -> &'static str {
        match self.language {
            Language::Zh => "所有区域",
            Language::En => "all areas",
        }
    }

    pub fn status(&self, phrase: StatusPhrase) -> &'static str {
        match (self.language, phrase) {
            (Language::Zh, StatusPhrase::TurnedOn) => "打开",
            (Language::Zh, StatusPhrase::TurnedOff) => "关闭",
            (Language::Zh, StatusPhrase::Adjusted) => "调整",
            (Language::En, StatusPhrase::TurnedOn) => "turned on",
            (Language::En, StatusPhrase::TurnedOff) => "turned off",
            (Language::En, StatusPhrase::Adjusted) => "adjusted",
        }
    }

    /// "The living room light has been turned on."
    pub fn applied(&self, location: &str, device_type: &str, phrase: StatusPhrase) -> String {
        let location = self.location(location);
        let device_type = self.device_type(device_type);
        let status = self.status(phrase);
        match self.language {
            Language::Zh => format!("已{}{}的{}", status, location, device_type),
            Language::En => format!("The {} {} has been {}.", location, device_type, status),
        }
    }

    /// Feedback when no device matched; `None` location means every room
    pub fn not_found(&self, location: Option<&str>, device_type: &str) -> String {
        let device_type = self.device_type(device_type);
        match self.language {
            Language::Zh => {
                let location = location.map_or_else(|| self.all_areas().to_string(), |l| self.location(l));
                format!("未找到{}的{}", location, device_type)
            }
            Language::En => {
                let article = if starts_with_vowel(&device_type) { "an" } else { "a" };
                match location {
                    Some(loc) => format!(
                        "Could not find {} {} in the {}.",
                        article,
                        device_type,
                        self.location(loc)
                    ),
                    None => format!("Could not find {} {} in {}.", article, device_type, self.all_areas()),
                }
            }
        }
    }

    pub fn missing_type_or_action(&self) -> &'static str {
        match self.language {
            Language::Zh => "无法执行操作：缺少设备类型或动作",
            Language::En => "Cannot execute: missing device type or action.",
        }
    }

    pub fn nlp_unavailable(&self) -> &'static str {
        match self.language {
            Language::Zh => "NLP服务不可用，请确保NLP服务已启动",
            Language::En => "NLP service unavailable, please make sure it is running.",
        }
    }

    /// Spoken fallback when a command could not be understood
    pub fn apology(&self) -> &'static str {
        match self.language {
            Language::Zh => "抱歉，我没能理解您的意思",
            Language::En => "Sorry, I didn't catch that.",
        }
    }

    pub fn no_nlu_result(&self) -> &'static str {
        match self.language {
            Language::Zh => "未能获取NLU结果",
            Language::En => "No NLU result returned by the NLP service.",
        }
    }

    pub fn empty_command(&self) -> &'static str {
        match self.language {
            Language::Zh => "命令为空",
            Language::En => "The command is empty.",
        }
    }

    pub fn internal_error(&self, detail: &str) -> String {
        match self.language {
            Language::Zh => format!("处理命令时出错: {}", detail),
            Language::En => format!("Error processing command: {}", detail),
        }
    }

    fn lookup(&self, table: &[(&str, &str, &str)], code: &str) -> String {
        let needle = code.trim().to_lowercase();
        match table.iter().find(|(c, _, _)| *c == needle) {
            Some((_, zh, en)) => match self.language {
                Language::Zh => zh.to_string(),
                Language::En => en.to_string(),
            },
            None => match self.language {
                Language::Zh => code.to_string(),
                Language::En => code.replace('_', " "),
            },
        }
    }
}

fn starts_with_vowel(word: &str) -> bool {
    word.chars()
        .next()
        .is_some_and(|c| matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u'))
}
