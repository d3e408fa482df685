//! Line-based terminal prompts
use async_trait::async_trait;
use reclaim_executor::{InputValidator, UiHandler};
use tokio::{
    io::{
        stdin, stdout, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines,
        Stdin, Stdout,
    },
    sync::Mutex,
};

/// Prompts the operator on a line-based terminal
pub struct TerminalUi<R, W> {
    input: Mutex<Lines<BufReader<R>>>,
    output: Mutex<W>,
}

impl TerminalUi<Stdin, Stdout> {
    pub fn stdio() -> Self {
        Self::new(stdin(), stdout())
    }
}

impl<R, W> TerminalUi<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input: Mutex::new(BufReader::new(input).lines()), output: Mutex::new(output) }
    }

    pub fn into_output(self) -> W {
        self.output.into_inner()
    }

    async fn write(&self, text: &str) -> eyre::Result<()> {
        let mut output = self.output.lock().await;
        output.write_all(text.as_bytes()).await?;
        output.flush().await?;
        Ok(())
    }

    async fn read_line(&self) -> eyre::Result<String> {
        let line = self.input.lock().await.next_line().await?;
        line.map(|l| l.trim().to_string()).ok_or_else(|| eyre::eyre!("Input closed"))
    }
}

#[async_trait]
impl<R, W> UiHandler for TerminalUi<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn get_user_input(
        &self,
        prompt: &str,
        validator: InputValidator<'_>,
        error_message: &str,
    ) -> eyre::Result<String> {
        loop {
            self.write(&format!("{prompt}: ")).await?;
            let input = self.read_line().await?;
            if validator(&input) {
                return Ok(input);
            }
            self.write(&format!("{error_message}\n")).await?;
        }
    }

    async fn confirm(&self, prompt: &str) -> eyre::Result<bool> {
        loop {
            self.write(&format!("{prompt} [y/N]: ")).await?;
            match self.read_line().await?.to_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "" | "n" | "no" => return Ok(false),
                _ => self.write("Please answer y or n\n").await?,
            }
        }
    }

    async fn get_selection(&self, prompt: &str, options: &[String]) -> eyre::Result<String> {
        if options.is_empty() {
            return Err(eyre::eyre!("Nothing to select for {prompt}"));
        }

        let mut menu = format!("{prompt}\n");
        for (i, option) in options.iter().enumerate() {
            menu.push_str(&format!("  {}) {option}\n", i + 1));
        }

        loop {
            self.write(&menu).await?;
            self.write(&format!("[1-{}]: ", options.len())).await?;
            let input = self.read_line().await?;

            let choice = match input.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => Some(&options[n - 1]),
                _ => options.iter().find(|o| o.eq_ignore_ascii_case(&input)),
            };
            if let Some(choice) = choice {
                return Ok(choice.clone());
            }
            self.write(&format!("{input} is not a valid choice\n")).await?;
        }
    }
}
