//! Fixed prompts for the two summarization passes.

use openai_api_rs::v1::chat_completion::{ChatCompletionMessage, Content, MessageRole};

use super::{ExampleTurn, TransformRequest};

/// First pass: one Japanese sentence of about fifty characters.
pub const CONDENSE_INSTRUCTION: &str =
    "英語の文章を次の条件で要約してください。\n- 日本語で回答\n- 50文字程度で回答\n- 1文で回答";

/// Second pass: squeeze the first pass down to about a hundred characters.
pub const SHORTEN_INSTRUCTION: &str = "文章を100文字程度で要約してください。";

pub const CALIBRATION_INPUT: &str = "Local governments in Japan are embracing ChatGPT, the generative AI chatbot developed by US venture firm OpenAI. \
Yokosuka, a city south of Tokyo, has become the first to implement the language model in all of its offices on an experimental basis.";

pub const CALIBRATION_OUTPUT: &str = "横須賀市が先駆けでChatGPTを実験的に導入。";

#[must_use]
pub fn condense_request(text: &str) -> TransformRequest {
    TransformRequest {
        system_instruction: CONDENSE_INSTRUCTION.to_string(),
        example_turns: vec![ExampleTurn {
            user: CALIBRATION_INPUT.to_string(),
            assistant: CALIBRATION_OUTPUT.to_string(),
        }],
        user_text: text.to_string(),
    }
}

#[must_use]
pub fn shorten_request(text: &str) -> TransformRequest {
    TransformRequest {
        system_instruction: SHORTEN_INSTRUCTION.to_string(),
        example_turns: Vec::new(),
        user_text: text.to_string(),
    }
}

fn message(role: MessageRole, text: &str) -> ChatCompletionMessage {
    ChatCompletionMessage {
        role,
        content: Content::Text(text.to_string()),
        name: None,
        tool_calls: None,
        tool_call_id: None,
    }
}

/// Lay a request out as chat messages: system, example turns, then the input.
#[must_use]
pub fn build_prompt(request: &TransformRequest) -> Vec<ChatCompletionMessage> {
    let mut chat = vec![message(MessageRole::system, &request.system_instruction)];

    for turn in &request.example_turns {
        chat.push(message(MessageRole::user, &turn.user));
        chat.push(message(MessageRole::assistant, &turn.assistant));
    }

    chat.push(message(MessageRole::user, &request.user_text));
    chat
}
