use crate::error::VestigeResult;
use async_trait::async_trait;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};

/// Line-oriented terminal the work log talks through
#[async_trait]
pub trait Console: Send {
    /// Show a prompt and read one line without its terminator.
    /// Returns `None` once input is exhausted.
    async fn ask(&mut self, prompt: &str) -> VestigeResult<Option<String>>;

    /// Print a status line
    fn say(&mut self, line: &str);
}

/// Console reading lines from `R` and printing to stdout
pub struct StdConsole<R = BufReader<Stdin>> {
    reader: R,
}

impl StdConsole {
    pub fn new() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: AsyncBufRead + Unpin + Send> StdConsole<R> {
    pub fn from_reader(reader: R) -> Self {
        Self { reader }
    }

    /// Next line with "\n" or "\r\n" removed. Bytes that are not UTF-8 are
    /// replaced rather than rejected, so any answer counts as input.
    async fn read_line(&mut self) -> VestigeResult<Option<String>> {
        let mut buf = Vec::new();
        if self.reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(None);
        }

        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }

        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> Console for StdConsole<R> {
    async fn ask(&mut self, prompt: &str) -> VestigeResult<Option<String>> {
        let mut stdout = std::io::stdout();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;

        self.read_line().await
    }

    fn say(&mut self, line: &str) {
        println!("{}", line);
    }
}
