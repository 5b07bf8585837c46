//! In-memory stand-ins for the chat transport and the model service.
#![allow(dead_code)]

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tldr_bot::ai::{GenerationParams, SummarizationModel};
use tldr_bot::core::SessionStore;
use tldr_bot::core::models::{ChatId, MessageHandle};
use tldr_bot::dialogue::DialogueController;
use tldr_bot::errors::BotError;
use tldr_bot::telegram::ReplyMarkup;
use tldr_bot::transport::ChatTransport;
use tldr_bot::worker::{ProgressMode, SummaryWorker};

/// End-of-sequence id emitted by [`FakeModel::generate`]; dropped when skipping special tokens.
pub const EOS_ID: u32 = 0;
const EOS_TOKEN: &str = "</s>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Send {
        chat_id: ChatId,
        handle: MessageHandle,
        text: String,
        markup: Option<ReplyMarkup>,
    },
    Edit {
        chat_id: ChatId,
        handle: MessageHandle,
        text: String,
    },
    Answer {
        callback_id: String,
    },
}

#[derive(Default)]
pub struct FakeTransport {
    calls: Mutex<Vec<Call>>,
    next_id: AtomicI64,
    failing_chat: Mutex<Option<ChatId>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every send to `chat_id` fail with an API error.
    pub fn fail_sends_to(&self, chat_id: ChatId) {
        *self.failing_chat.lock().unwrap() = Some(chat_id);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Texts and markups sent to one chat, in order.
    pub fn sent_to(&self, chat_id: ChatId) -> Vec<(String, Option<ReplyMarkup>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Send {
                    chat_id: c,
                    text,
                    markup,
                    ..
                } if c == chat_id => Some((text, markup)),
                _ => None,
            })
            .collect()
    }

    pub fn texts_to(&self, chat_id: ChatId) -> Vec<String> {
        self.sent_to(chat_id).into_iter().map(|(t, _)| t).collect()
    }

    pub fn edits_to(&self, chat_id: ChatId) -> Vec<(MessageHandle, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Edit {
                    chat_id: c,
                    handle,
                    text,
                } if c == chat_id => Some((handle, text)),
                _ => None,
            })
            .collect()
    }

    pub fn handle_of(&self, chat_id: ChatId, text: &str) -> Option<MessageHandle> {
        self.calls().into_iter().find_map(|call| match call {
            Call::Send {
                chat_id: c,
                handle,
                text: t,
                ..
            } if c == chat_id && t == text => Some(handle),
            _ => None,
        })
    }
}

#[async_trait]
impl ChatTransport for FakeTransport {
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        markup: Option<&ReplyMarkup>,
    ) -> Result<MessageHandle, BotError> {
        if *self.failing_chat.lock().unwrap() == Some(chat_id) {
            return Err(BotError::ApiError("HTTP 403: bot was blocked".into()));
        }
        let handle = MessageHandle(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.calls.lock().unwrap().push(Call::Send {
            chat_id,
            handle,
            text: text.to_string(),
            markup: markup.cloned(),
        });
        Ok(handle)
    }

    async fn edit_message(
        &self,
        chat_id: ChatId,
        handle: MessageHandle,
        text: &str,
    ) -> Result<(), BotError> {
        self.calls.lock().unwrap().push(Call::Edit {
            chat_id,
            handle,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), BotError> {
        self.calls.lock().unwrap().push(Call::Answer {
            callback_id: callback_id.to_string(),
        });
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizeCall {
    pub text: String,
    pub max_length: usize,
    pub truncation: bool,
}

/// Word-level "model": tokenizes on whitespace and summarizes by keeping the first
/// `keep` words of the input.
pub struct FakeModel {
    vocab: Mutex<Vec<String>>,
    keep: usize,
    delay: Option<Duration>,
    fail_generate: bool,
    ignore_truncation: bool,
    tokenize_calls: Mutex<Vec<TokenizeCall>>,
    generate_calls: Mutex<Vec<(Vec<u32>, GenerationParams)>>,
}

impl Default for FakeModel {
    fn default() -> Self {
        Self {
            vocab: Mutex::new(vec![EOS_TOKEN.to_string()]),
            keep: 5,
            delay: None,
            fail_generate: false,
            ignore_truncation: false,
            tokenize_calls: Mutex::new(Vec::new()),
            generate_calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_keep(mut self, keep: usize) -> Self {
        self.keep = keep;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_generate = true;
        self
    }

    /// Behave like a tokenizer that does not honour `truncation`.
    pub fn ignoring_truncation(mut self) -> Self {
        self.ignore_truncation = true;
        self
    }

    pub fn tokenize_calls(&self) -> Vec<TokenizeCall> {
        self.tokenize_calls.lock().unwrap().clone()
    }

    pub fn generate_calls(&self) -> Vec<(Vec<u32>, GenerationParams)> {
        self.generate_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SummarizationModel for FakeModel {
    async fn tokenize(
        &self,
        text: &str,
        max_length: usize,
        truncation: bool,
    ) -> Result<Vec<u32>, BotError> {
        self.tokenize_calls.lock().unwrap().push(TokenizeCall {
            text: text.to_string(),
            max_length,
            truncation,
        });

        let mut vocab = self.vocab.lock().unwrap();
        let mut ids: Vec<u32> = text
            .split_whitespace()
            .map(|word| {
                vocab.push(word.to_string());
                u32::try_from(vocab.len() - 1).unwrap()
            })
            .collect();
        if truncation && !self.ignore_truncation {
            ids.truncate(max_length);
        }
        Ok(ids)
    }

    async fn generate(
        &self,
        input_ids: &[u32],
        params: GenerationParams,
    ) -> Result<Vec<u32>, BotError> {
        self.generate_calls
            .lock()
            .unwrap()
            .push((input_ids.to_vec(), params));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_generate {
            return Err(BotError::ModelError("generate HTTP 500: CUDA out of memory".into()));
        }
        let mut out: Vec<u32> = input_ids.iter().copied().take(self.keep).collect();
        out.push(EOS_ID);
        Ok(out)
    }

    async fn detokenize(&self, ids: &[u32], skip_special_tokens: bool) -> Result<String, BotError> {
        let vocab = self.vocab.lock().unwrap();
        let words: Vec<&str> = ids
            .iter()
            .filter(|&&id| !(skip_special_tokens && id == EOS_ID))
            .map(|&id| vocab[id as usize].as_str())
            .collect();
        Ok(words.join(" "))
    }
}

pub struct Harness {
    pub transport: Arc<FakeTransport>,
    pub model: Arc<FakeModel>,
    pub controller: DialogueController,
}

pub fn harness(model: FakeModel, mode: ProgressMode) -> Harness {
    harness_with_pool(model, mode, 4)
}

pub fn harness_with_pool(model: FakeModel, mode: ProgressMode, max_concurrent: usize) -> Harness {
    let transport = FakeTransport::new();
    let model = Arc::new(model);
    let worker = SummaryWorker::new(
        transport.clone(),
        model.clone(),
        mode,
        max_concurrent,
    )
    .with_tick_interval(Duration::from_secs(1));
    let controller = DialogueController::new(
        transport.clone(),
        SessionStore::new(),
        worker,
        "test-model".to_string(),
    );
    Harness {
        transport,
        model,
        controller,
    }
}
