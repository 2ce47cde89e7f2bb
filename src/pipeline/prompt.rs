//! Prompt construction. Pure functions: same inputs, same prompt.

use super::conversation::ConversationTurn;
use super::language_gate::TargetLanguage;
use crate::store::Corpus;

/// Role framing for the interactive advisory chat.
pub const ADVISOR_FRAMING: &str =
    "你是餐飲經營顧問，根據以下餐廳特色與對話，給出具體經營建議。";

/// Open assistant-turn marker closing every advisory prompt.
pub const ASSISTANT_TURN_MARKER: &str = "AI：";

/// Build the advisory prompt: framing, feature description, every turn of
/// the history on its own line, then the open assistant turn.
///
/// The history is never truncated.
pub fn build_advisory_prompt(features: &str, history: &[ConversationTurn]) -> String {
    let mut prompt = String::new();
    prompt.push_str(ADVISOR_FRAMING);
    prompt.push('\n');
    prompt.push_str("餐廳特色：\n");
    prompt.push_str(features);
    prompt.push('\n');
    prompt.push_str("對話記錄：\n");
    for turn in history {
        prompt.push_str(&turn.render());
        prompt.push('\n');
    }
    prompt.push_str(ASSISTANT_TURN_MARKER);
    prompt
}

/// Build the one-shot review summary prompt. The corpus is appended verbatim.
pub fn build_summary_prompt(corpus: &Corpus, language: &TargetLanguage) -> String {
    format!(
        "你是餐飲評論分析師，請根據下方多則顧客留言，\n\
         用「{lang}」寫一段約 300–350 字的摘要，\n\
         說明：①菜色/飲品特色，②服務優缺點，③店內氛圍，\n\
         最後給 1 條具體經營改善建議。\n\
         僅需純文字，不要標題、不要條列符號。\n\
         顧客留言：\n{corpus}",
        lang = language.display_name,
        corpus = corpus.text()
    )
}

/// Wrap earlier output in a request for a complete, unannotated translation.
pub fn build_translation_prompt(text: &str, language: &TargetLanguage) -> String {
    format!(
        "請把下列內容完整翻成「{}」，不要加任何註解：\n{}",
        language.display_name, text
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::conversation::Speaker;
    use crate::store::{ReviewAggregator, ReviewDocument};

    fn turn(speaker: Speaker, text: &str) -> ConversationTurn {
        ConversationTurn::new(speaker, text)
    }

    #[test]
    fn advisory_prompt_layout() {
        let history = vec![
            turn(Speaker::Operator, "午餐客人太少怎麼辦？"),
            turn(Speaker::Assistant, "可以推出商業午餐套餐。"),
            turn(Speaker::Operator, "價格怎麼訂？"),
        ];
        let prompt = build_advisory_prompt("台式早午餐，主打手工蛋餅", &history);
        assert_eq!(
            prompt,
            "你是餐飲經營顧問，根據以下餐廳特色與對話，給出具體經營建議。\n\
             餐廳特色：\n台式早午餐，主打手工蛋餅\n\
             對話記錄：\n\
             營業者：午餐客人太少怎麼辦？\n\
             AI：可以推出商業午餐套餐。\n\
             營業者：價格怎麼訂？\n\
             AI："
        );
    }

    #[test]
    fn advisory_prompt_keeps_full_history() {
        let history: Vec<ConversationTurn> = (0..50)
            .map(|i| turn(Speaker::Operator, &format!("question {i}")))
            .collect();
        let prompt = build_advisory_prompt("features", &history);
        assert!(prompt.contains("營業者：question 0\n"));
        assert!(prompt.contains("營業者：question 49\n"));
        assert!(prompt.ends_with(ASSISTANT_TURN_MARKER));
    }

    #[test]
    fn advisory_prompt_is_deterministic() {
        let history = vec![turn(Speaker::Operator, "hi")];
        assert_eq!(
            build_advisory_prompt("f", &history),
            build_advisory_prompt("f", &history)
        );
    }

    #[test]
    fn summary_prompt_appends_corpus_verbatim() {
        let docs = [ReviewDocument::new(
            "r/1",
            serde_json::from_value(serde_json::json!({
                "comment": {"arrayValue": {"values": [
                    {"stringValue": "牛肉麵湯頭濃郁"}, {"stringValue": "Waiter was rude"}
                ]}}
            }))
            .unwrap(),
        )];
        let corpus = ReviewAggregator::new("comment").aggregate(&docs);
        let prompt = build_summary_prompt(&corpus, &TargetLanguage::TRADITIONAL_CHINESE);

        assert!(prompt.contains("用「繁體中文」寫一段約 300–350 字的摘要"));
        assert!(prompt.contains("不要標題、不要條列符號"));
        assert!(prompt.contains("最後給 1 條具體經營改善建議"));
        assert!(prompt.ends_with("顧客留言：\n牛肉麵湯頭濃郁\nWaiter was rude"));
    }

    #[test]
    fn translation_prompt_names_target_language() {
        let prompt = build_translation_prompt("Good food.", &TargetLanguage::JAPANESE);
        assert_eq!(prompt, "請把下列內容完整翻成「日文」，不要加任何註解：\nGood food.");
    }
}
