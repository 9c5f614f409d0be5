use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;

use ifrepair_core::context::GameContext;
use ifrepair_core::dictionary::Dictionary;
use ifrepair_core::llm::HttpLlmClient;
use ifrepair_core::story::StoryReader;
use ifrepair_core::telemetry::TelemetryLogger;
use ifrepair_core::vocabulary::Vocabulary;
use ifrepair_core::{attempt_repair, failure_detector, finalize_replay, RetryOutcome, RewriterConfig};

use crate::errors::{IFtError, IFtResult};

/// Z-machine story header offset of the dictionary table address
/// (header byte 0x08-0x09).
const HEADER_VERSION_OFFSET: usize = 0x00;
const HEADER_DICTIONARY_OFFSET: usize = 0x08;

/// Drives a spawned Z-machine interpreter subprocess, intercepting
/// parser failures and attempting one vocabulary-bounded rewrite before
/// falling back to disclosing the interpreter's own message.
///
/// A background thread owns the subprocess's stdout and forwards lines
/// over an `mpsc::channel`; the main loop drains that channel with
/// `recv_timeout` to detect the idle window marking the end of one
/// interpreter response.
pub struct IFTerminalClient {
    vocab: Vocabulary,
    child: Child,
    stdin: ChildStdin,
    output_rx: Receiver<String>,
    llm: HttpLlmClient,
    telemetry: Box<dyn TelemetryLogger>,
    config: RewriterConfig,
    context: GameContext,
}

impl IFTerminalClient {
    pub fn spawn(
        story_path: &Path,
        interpreter_cmd: &str,
        config: RewriterConfig,
        telemetry: Box<dyn TelemetryLogger>,
    ) -> IFtResult<Self> {
        let story_bytes = std::fs::read(story_path)?;
        let story = StoryReader::from_bytes(story_bytes);
        let version = story.read_u8(HEADER_VERSION_OFFSET)?;
        let dict_offset = story.read_u16_be(HEADER_DICTIONARY_OFFSET)?;
        let dictionary = Dictionary::parse(&story, dict_offset, version)?;
        let vocab = Vocabulary::from_dictionary(&dictionary);

        let mut child = Command::new(interpreter_cmd)
            .arg(story_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()?;

        let stdin = child.stdin.take().ok_or(IFtError::InterpreterExited)?;
        let stdout = child.stdout.take().ok_or(IFtError::InterpreterExited)?;

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines() {
                match line {
                    Ok(text) => {
                        if tx.send(text).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        });

        let llm = HttpLlmClient::new(config.provider.clone())?;

        Ok(IFTerminalClient {
            vocab,
            child,
            stdin,
            output_rx: rx,
            llm,
            telemetry,
            config,
            context: GameContext::new(),
        })
    }

    /// Drains every line currently buffered, blocking up to `idle_flush`
    /// after the last received line to give the interpreter a chance to
    /// finish writing its response.
    fn drain_response(&mut self) -> String {
        let mut lines = Vec::new();
        loop {
            match self.output_rx.recv_timeout(self.config.idle_flush) {
                Ok(line) => lines.push(line),
                Err(_) => break,
            }
        }
        lines.join("\n")
    }

    fn send_command(&mut self, command: &str) -> IFtResult<()> {
        writeln!(self.stdin, "{command}")?;
        self.stdin.flush()?;
        Ok(())
    }

    /// Runs the read-eval-print loop over stdin/stdout until the player
    /// quits or the interpreter exits.
    pub fn run(&mut self) -> IFtResult<()> {
        let stdin = io::stdin();
        println!("{}", self.drain_response());

        loop {
            print!("> ");
            io::stdout().flush()?;
            let mut command = String::new();
            if stdin.lock().read_line(&mut command)? == 0 {
                break;
            }
            let command = command.trim().to_string();
            if command.is_empty() {
                continue;
            }

            self.send_command(&command)?;
            let response = self.drain_response();
            println!("{response}");

            let Some(failure) = failure_detector::detect(&command, &response) else {
                self.context.set_last_output(&response);
                continue;
            };

            let outcome = attempt_repair(
                &failure,
                &self.context,
                &self.vocab,
                &self.llm,
                self.telemetry.as_ref(),
            );
            self.context.set_last_output(&response);

            match outcome {
                RetryOutcome::Replay(rewrite) => {
                    log::info!("retrying \"{command}\" as \"{rewrite}\"");
                    self.send_command(&rewrite)?;
                    let replay_response = self.drain_response();
                    let replay_failed =
                        failure_detector::detect(&rewrite, &replay_response).is_some();
                    self.context.set_last_output(&replay_response);
                    match finalize_replay(
                        &failure,
                        &rewrite,
                        !replay_failed,
                        &replay_response,
                        self.telemetry.as_ref(),
                    )? {
                        Some(original_message) => println!("{original_message}"),
                        None => println!("{replay_response}"),
                    }
                }
                RetryOutcome::Disclose { original_message } => {
                    println!("{original_message}");
                }
            }
        }

        self.telemetry.flush();
        self.child.wait()?;
        Ok(())
    }
}
