use clap::Subcommand;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Full-screen chat window (default)
    Tui,

    /// Line-by-line chat on stdin/stdout
    Chat,

    /// Send a single prompt and print the reply
    Ask {
        /// Prompt text; read from stdin when omitted
        prompt: Option<String>,
    },

    /// Start the JSON web backend
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8000")]
        port: u16,

        /// Bind to 0.0.0.0 instead of 127.0.0.1, exposing the server on all network interfaces
        #[arg(long)]
        public: bool,
    },
}
