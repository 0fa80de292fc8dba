//! Reviewer 提示词构建
//!
//! 分析提示与训练提示的文本格式固定，Reviewer 侧依赖这些格式。

/// 逐行构建提示词
#[derive(Debug, Default)]
pub struct PromptBuilder {
    lines: Vec<String>,
}

impl PromptBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一行
    pub fn line(mut self, content: impl Into<String>) -> Self {
        self.lines.push(content.into());
        self
    }

    /// 追加空行
    pub fn blank(self) -> Self {
        self.line("")
    }

    /// 构建最终 Prompt
    pub fn build(&self) -> String {
        self.lines.join("\n")
    }
}

/// 请 Reviewer 评判一组 提问/回答
pub fn analysis_prompt(prompt: &str, responder_answer: &str) -> String {
    PromptBuilder::new()
        .line(format!("Analyze the following response to the prompt '{prompt}':"))
        .blank()
        .line(format!("Response: {responder_answer}"))
        .blank()
        .line("Is this response correct and helpful? Provide feedback.")
        .build()
}

/// 将人工确认的裁决回灌给 Reviewer
pub fn training_prompt(
    prompt: &str,
    responder_answer: &str,
    is_correct: bool,
    feedback: &str,
) -> String {
    PromptBuilder::new()
        .line("Learn from this interaction:")
        .line(format!("Prompt: {prompt}"))
        .line(format!("Response: {responder_answer}"))
        .line(format!("Correct: {is_correct}"))
        .line(format!("Feedback: {feedback}"))
        .build()
}
