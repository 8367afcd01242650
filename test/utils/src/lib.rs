/// History as persisted by earlier releases, newest first.
pub fn history_json_fixture() -> &'static str {
    return r#"
[
  {
    "id": "k3j9x0a1q",
    "sourceText": "Good morning",
    "translatedText": "صبح بخیر",
    "direction": "en-to-fa",
    "timestamp": 1717243200000
  },
  {
    "id": "p0m2c8z7w",
    "sourceText": "خیلی ممنون",
    "translatedText": "Thank you very much",
    "direction": "fa-to-en",
    "timestamp": 1717239600000
  }
]
"#
    .trim();
}

pub fn gemini_response_fixture() -> &'static str {
    return r#"
{
  "candidates": [
    {
      "content": {
        "parts": [
          { "text": "سلام " },
          { "text": "دنیا\n" }
        ],
        "role": "model"
      },
      "finishReason": "STOP",
      "index": 0
    }
  ],
  "usageMetadata": {
    "promptTokenCount": 42,
    "candidatesTokenCount": 3,
    "totalTokenCount": 45
  }
}
"#
    .trim();
}

pub fn openai_response_fixture() -> &'static str {
    return r#"
{
  "id": "chatcmpl-123",
  "object": "chat.completion",
  "created": 1677652288,
  "model": "gpt-4o-mini",
  "choices": [
    {
      "index": 0,
      "message": {
        "role": "assistant",
        "content": "Thank you very much"
      },
      "finish_reason": "stop"
    }
  ]
}
"#
    .trim();
}
