pub fn start() -> String {
    "Hi!\n\
     I can list the participants of a Telegram chat from its export files.\n\n\
     1. Export the chat history in Telegram Desktop.\n\
     2. Send me 1 to 10 export files.\n\
     3. Press Start processing."
        .to_string()
}

pub fn export_help() -> String {
    "To export a chat:\n\
     1. Open Telegram Desktop.\n\
     2. Select the chat.\n\
     3. Menu → Export chat history.\n\
     4. Choose the JSON format.\n\
     5. Save the file and send it here."
        .to_string()
}

pub fn faq() -> String {
    "How to use the bot:\n\n\
     1. Export the chat with Telegram Desktop.\n\
     2. Send 1–10 export files here.\n\
     3. Press Start processing.\n\n\
     The bot does not keep your data.\n\
     Only the JSON export format is supported."
        .to_string()
}

pub fn stopped() -> String {
    "OK, the current session is stopped.\n\nPress /start to begin again.".to_string()
}

pub fn expired() -> String {
    "The session has expired.\nPlease start again.".to_string()
}

pub fn already_processing() -> String {
    "Processing is already running.\nThis file will not be part of the current report.".to_string()
}

pub fn unsupported_format() -> String {
    "Unsupported file format.\nOnly JSON is supported.".to_string()
}

pub fn too_many_files(max: usize) -> String {
    format!("You can upload at most {} files per run.\nStart a new session.", max)
}

pub fn file_accepted(count: usize) -> String {
    format!(
        "File accepted.\nUploaded so far: {} file(s).\n\nSend more files or press Start processing.",
        count
    )
}

pub fn no_files() -> String {
    "Upload at least one export file first.".to_string()
}

pub fn processing_started(total: usize) -> String {
    format!("Processing {} file(s).\nPlease wait.", total)
}

pub fn file_progress(index: usize, total: usize) -> String {
    format!("File {}/{} processed.", index, total)
}

pub fn spreadsheet_caption(index: usize, total: usize, file_name: &str, participants: usize, mentions: usize) -> String {
    format!(
        "{}\nDone.\nFile: {}\nParticipants count: {}\nMentions count: {}\nThe results are in the Excel file.",
        file_progress(index, total),
        file_name,
        participants,
        mentions
    )
}

pub fn processing_failed() -> String {
    "Something went wrong while processing the files.\nCheck the export format and try again.".to_string()
}

pub fn unknown_command() -> String {
    "Unknown command.".to_string()
}

pub fn run_in_progress() -> String {
    "Processing is already running.\nWait for the results.".to_string()
}
