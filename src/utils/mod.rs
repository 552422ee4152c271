use std::path::PathBuf;

const APP_DIR_NAME: &str = "shabyt";

pub fn get_app_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(|| {
            let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
            path.push(".local/share");
            path.push(APP_DIR_NAME);
            path
        })
}

pub fn get_database_path() -> PathBuf {
    let mut path = get_app_data_dir();
    path.push("assistant.db");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_path_inside_app_dir() {
        let db = get_database_path();
        assert!(db.starts_with(get_app_data_dir()));
        assert!(db.ends_with("assistant.db"));
    }
}
