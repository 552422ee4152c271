//! 回退应答模块
//! 外部生成服务不可用时，按关键词表给出固定应答

use crate::services::language::SupportedLanguage;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 关键词组与对应应答
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CannedEntry {
    pub keywords: Vec<String>,
    pub response: String,
}

/// 单一语言的应答表，按顺序匹配
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageResponses {
    pub entries: Vec<CannedEntry>,
    pub default_response: String,
}

impl LanguageResponses {
    /// 第一个命中的关键词决定应答，否则返回默认应答
    pub fn select(&self, question: &str) -> &str {
        let lowered = question.to_lowercase();

        self.entries
            .iter()
            .find(|entry| entry.keywords.iter().any(|k| lowered.contains(k.as_str())))
            .map(|entry| entry.response.as_str())
            .unwrap_or(self.default_response.as_str())
    }

    fn normalize(&mut self) {
        for entry in &mut self.entries {
            for keyword in &mut entry.keywords {
                *keyword = keyword.to_lowercase();
            }
        }
    }

    fn validate(&self, language: SupportedLanguage) -> Result<()> {
        if self.default_response.trim().is_empty() {
            bail!("default response for '{}' is empty", language);
        }
        for entry in &self.entries {
            if entry.response.trim().is_empty() {
                bail!("empty response in '{}' table", language);
            }
            if entry.keywords.is_empty() || entry.keywords.iter().any(|k| k.is_empty()) {
                bail!("entry with empty keyword in '{}' table", language);
            }
        }
        Ok(())
    }
}

/// 全部语言的应答表，进程启动时加载，之后只读
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CannedResponseTable {
    pub ru: LanguageResponses,
    pub kk: LanguageResponses,
}

impl CannedResponseTable {
    /// 内置应答表
    pub fn builtin() -> Self {
        Self {
            ru: LanguageResponses {
                entries: entries(RUSSIAN_ENTRIES),
                default_response: RUSSIAN_DEFAULT.to_string(),
            },
            kk: LanguageResponses {
                entries: entries(KAZAKH_ENTRIES),
                default_response: KAZAKH_DEFAULT.to_string(),
            },
        }
    }

    /// 从 JSON 文本加载
    pub fn from_json_str(content: &str) -> Result<Self> {
        let mut table: CannedResponseTable =
            serde_json::from_str(content).context("failed to parse canned response table")?;

        table.ru.normalize();
        table.kk.normalize();
        table.ru.validate(SupportedLanguage::Russian)?;
        table.kk.validate(SupportedLanguage::Kazakh)?;

        Ok(table)
    }

    /// 从 JSON 文件加载
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json_str(&content)
    }

    pub fn for_language(&self, language: SupportedLanguage) -> &LanguageResponses {
        match language {
            SupportedLanguage::Russian => &self.ru,
            SupportedLanguage::Kazakh => &self.kk,
        }
    }

    /// 回退应答，总能返回非空文本
    pub fn fallback(&self, question: &str, language: SupportedLanguage) -> &str {
        self.for_language(language).select(question)
    }
}

impl Default for CannedResponseTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn entries(raw: &[(&[&str], &str)]) -> Vec<CannedEntry> {
    raw.iter()
        .map(|(keywords, response)| CannedEntry {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            response: response.to_string(),
        })
        .collect()
}

// ==================== 内置数据 ====================

const RUSSIAN_ENTRIES: &[(&[&str], &str)] = &[
    (
        &["казахстан"],
        "Казахстан — государство в Центральной Азии, бывшая советская республика. Столица — Астана. Население составляет более 19 миллионов человек. Государственным языком является казахский, а русский имеет статус языка межнационального общения. Казахстан обрел независимость в 1991 году после распада Советского Союза.",
    ),
    (
        &["ент"],
        "ЕНТ (Единое Национальное Тестирование) - это стандартизированный экзамен для выпускников школ в Казахстане. Он используется для поступления в высшие учебные заведения. Основные предметы включают математику, историю Казахстана, грамматику казахского/русского языка и предметы по выбору в зависимости от выбранной специальности.",
    ),
    (
        &["математик", "алгебр", "геометр"],
        "В математической части ЕНТ тестируются знания по алгебре, геометрии и математическому анализу. Ключевые темы включают функции, уравнения, неравенства, векторы, производные и интегралы. Рекомендую начать с базовых концепций и постепенно переходить к более сложным задачам.",
    ),
    (
        &["физик"],
        "Физика на ЕНТ охватывает механику, термодинамику, электричество и магнетизм, оптику и элементы квантовой физики. Особое внимание уделяется умению решать задачи и применять физические законы. Регулярная практика решения задач - ключ к успеху в этом разделе.",
    ),
    (
        &["истори"],
        "История Казахстана на ЕНТ охватывает периоды от древности до современности. Важные темы включают: древние государства на территории Казахстана, средневековые ханства, присоединение к Российской империи, советский период и независимый Казахстан. Необходимо знать ключевые даты, личности и события.",
    ),
    (
        &["химия", "хими"],
        "Химия на ЕНТ включает общую, неорганическую и органическую химию. Важно знать периодическую таблицу, химические реакции, уметь решать задачи на расчет массы, объема и концентрации веществ. Рекомендую регулярно практиковаться в решении химических задач и уравнений.",
    ),
    (
        &["биолог"],
        "Биология на ЕНТ включает цитологию, ботанику, зоологию, анатомию, генетику и экологию. Особое внимание уделяется терминологии, классификации организмов и пониманию биологических процессов. Используйте мнемонические приемы для запоминания сложных терминов и систематики.",
    ),
    (
        &["английск", "англ"],
        "Английский язык на ЕНТ проверяет навыки грамматики, лексики, чтения и понимания текста. Важно знать основные времена, конструкции, фразовые глаголы и иметь хороший словарный запас. Рекомендую регулярно читать тексты на английском и решать практические задания.",
    ),
    (
        &["привет", "здравств"],
        "Здравствуйте! Я Shabyt ЕНТ-ассистент. Я могу помочь вам с подготовкой к экзамену, ответить на вопросы по школьной программе или объяснить сложные темы. Что вас интересует?",
    ),
    (
        &["как дела", "как у тебя дела"],
        "У меня всё хорошо, спасибо! Я готов помочь вам с вопросами по подготовке к ЕНТ. Какой предмет вас интересует?",
    ),
    (
        &["помощь", "помоги"],
        "Я могу помочь вам с подготовкой к ЕНТ по разным предметам, объяснить сложные концепции и предложить стратегии обучения. Просто задайте мне конкретный вопрос по любому предмету.",
    ),
];

const RUSSIAN_DEFAULT: &str = "Я могу помочь вам с информацией по предметам ЕНТ, стратегиям подготовки и различным темам школьной программы. Задайте мне вопрос о конкретном предмете или теме, и я постараюсь предоставить полезную информацию.";

const KAZAKH_ENTRIES: &[(&[&str], &str)] = &[
    (
        &["қазақстан"],
        "Қазақстан — Орталық Азиядағы мемлекет. Астанасы — Астана қаласы. Халқының саны 19 миллионнан асады. Мемлекеттік тіл — қазақ тілі. Қазақстан 1991 жылы тәуелсіздік алды.",
    ),
    (
        &["ұбт"],
        "ҰБТ (Ұлттық бірыңғай тестілеу) — мектеп түлектеріне арналған стандартталған емтихан. Оның нәтижесі жоғары оқу орындарына түсу үшін қолданылады. Міндетті пәндерге математикалық сауаттылық, оқу сауаттылығы және Қазақстан тарихы кіреді, ал бейіндік пәндер мамандыққа қарай таңдалады.",
    ),
    (
        &["математика", "алгебра", "геометрия"],
        "ҰБТ-дағы математика алгебра, геометрия және математикалық анализ бойынша білімді тексереді. Негізгі тақырыптар: функциялар, теңдеулер, теңсіздіктер, векторлар, туындылар мен интегралдар. Алдымен негізгі ұғымдарды меңгеріп, біртіндеп күрделі есептерге көшуге кеңес беремін.",
    ),
    (
        &["физика"],
        "ҰБТ-дағы физика механиканы, термодинамиканы, электр және магнетизмді, оптиканы қамтиды. Заңдарды есеп шығаруда қолдана білу маңызды. Есептерді үнемі шығарып жаттығу — табыстың кілті.",
    ),
    (
        &["тарих"],
        "Қазақстан тарихы ежелгі дәуірден бүгінгі күнге дейінгі кезеңдерді қамтиды: ежелгі мемлекеттер, ортағасырлық хандықтар, Ресей империясының құрамына енуі, кеңестік кезең және тәуелсіз Қазақстан. Негізгі даталарды, тұлғаларды және оқиғаларды білу қажет.",
    ),
    (
        &["химия"],
        "ҰБТ-дағы химия жалпы, бейорганикалық және органикалық химияны қамтиды. Периодтық кестені, химиялық реакцияларды білу және масса, көлем, концентрация есептерін шығара білу маңызды.",
    ),
    (
        &["биология"],
        "ҰБТ-дағы биология цитология, ботаника, зоология, анатомия, генетика және экология бөлімдерін қамтиды. Терминологияға және организмдердің жіктелуіне ерекше назар аударыңыз.",
    ),
    (
        &["ағылшын"],
        "Ағылшын тілі бөлімі грамматиканы, лексиканы және мәтінді түсінуді тексереді. Негізгі шақтарды, тұрақты тіркестерді білу және сөздік қорды үнемі толықтыру маңызды.",
    ),
    (
        &["сәлем", "салем"],
        "Сәлеметсіз бе! Мен Shabyt ҰБТ-көмекшісімін. Емтиханға дайындалуға, мектеп бағдарламасы бойынша сұрақтарға жауап беруге көмектесе аламын. Сізді не қызықтырады?",
    ),
    (
        &["қалайсың", "қалың қалай"],
        "Рахмет, жақсы! ҰБТ-ға дайындық бойынша сұрақтарыңызға көмектесуге дайынмын. Қай пән қызықтырады?",
    ),
    (
        &["көмек"],
        "Мен ҰБТ-ға әртүрлі пәндер бойынша дайындалуға, күрделі ұғымдарды түсіндіруге және оқу стратегияларын ұсынуға көмектесе аламын. Кез келген пән бойынша нақты сұрақ қойыңыз.",
    ),
];

const KAZAKH_DEFAULT: &str = "Мен ҰБТ пәндері, дайындық стратегиялары және мектеп бағдарламасының әртүрлі тақырыптары бойынша ақпарат бере аламын. Нақты пән немесе тақырып туралы сұрақ қойыңыз, мен пайдалы ақпарат беруге тырысамын.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_matching_keyword_wins() {
        let table = CannedResponseTable::builtin();
        // "казахстан" 排在 "истори" 之前
        let answer = table.fallback("История Казахстана", SupportedLanguage::Russian);
        assert!(answer.starts_with("Казахстан — государство"));
    }

    #[test]
    fn test_case_folding() {
        let table = CannedResponseTable::builtin();
        let answer = table.fallback("Расскажи про ФИЗИКУ", SupportedLanguage::Russian);
        assert!(answer.starts_with("Физика на ЕНТ"));

        let answer = table.fallback("ҰБТ деген не?", SupportedLanguage::Kazakh);
        assert!(answer.starts_with("ҰБТ (Ұлттық"));
    }

    #[test]
    fn test_default_response() {
        let table = CannedResponseTable::builtin();

        let ru = table.fallback("Сколько стоит билет?", SupportedLanguage::Russian);
        assert_eq!(ru, RUSSIAN_DEFAULT);

        let kk = table.fallback("Бүгін ауа райы қандай?", SupportedLanguage::Kazakh);
        assert_eq!(kk, KAZAKH_DEFAULT);
        assert!(!kk.is_empty());
    }

    #[test]
    fn test_deterministic() {
        let table = CannedResponseTable::builtin();
        let first = table.fallback("помоги с химией", SupportedLanguage::Russian).to_string();
        let second = table.fallback("помоги с химией", SupportedLanguage::Russian).to_string();
        assert_eq!(first, second);
    }

    #[test]
    fn test_load_from_json() {
        let json = r#"{
            "ru": {"entries": [{"keywords": ["ТЕСТ"], "response": "ответ"}], "default_response": "по умолчанию"},
            "kk": {"entries": [], "default_response": "әдепкі"}
        }"#;

        let table = CannedResponseTable::from_json_str(json).unwrap();
        assert_eq!(table.ru.entries[0].keywords[0], "тест");
        assert_eq!(table.fallback("какой тест?", SupportedLanguage::Russian), "ответ");
        assert_eq!(table.fallback("не знаю", SupportedLanguage::Kazakh), "әдепкі");
    }

    #[test]
    fn test_load_rejects_empty_default() {
        let json = r#"{
            "ru": {"entries": [], "default_response": "  "},
            "kk": {"entries": [], "default_response": "әдепкі"}
        }"#;

        assert!(CannedResponseTable::from_json_str(json).is_err());
    }

    #[test]
    fn test_load_rejects_empty_keyword() {
        let json = r#"{
            "ru": {"entries": [{"keywords": [""], "response": "x"}], "default_response": "y"},
            "kk": {"entries": [], "default_response": "z"}
        }"#;

        assert!(CannedResponseTable::from_json_str(json).is_err());
    }
}
