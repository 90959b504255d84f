//! Document store addressing

const SCHEME: &str = "mongodb://";

/// Where and how to reach the document store
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    /// One standalone address, or every replica set member
    pub addresses: Vec<String>,
    pub replica_set: bool,
    pub database: String,
    pub username: String,
    pub password: String,
    pub url_options: String,
}

impl ConnectionTarget {
    /// Full connection string, including credentials
    pub fn uri(&self) -> String {
        self.render(&self.password)
    }

    /// Connection string safe to log
    pub fn redacted_uri(&self) -> String {
        self.render("***")
    }

    fn render(&self, password: &str) -> String {
        format!(
            "{SCHEME}{}:{password}@{}/{}?{}",
            self.username,
            self.addresses.join(","),
            self.database,
            self.url_options
        )
    }
}

impl std::fmt::Debug for ConnectionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionTarget")
            .field("addresses", &self.addresses)
            .field("replica_set", &self.replica_set)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"***REDACTED***")
            .field("url_options", &self.url_options)
            .finish()
    }
}
