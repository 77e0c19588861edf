//! osr-login - OSR portal login from the terminal
//!
//! Lists the caller's tenants and resolves gateway connection info.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use osr_login::config::Config;
use osr_login::{
    logging, Environment, PortalAddress, PortalSettings, Tenant, TenantAuthorizer,
    UserInfoResolver,
};

#[derive(Parser)]
#[command(name = "osr-login")]
#[command(about = "Log in to the OSR portal and resolve tenant gateway connections", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Portal environment: production, europe, staging, qa, development, custom
    #[arg(short, long, global = true)]
    environment: Option<Environment>,

    /// Portal address for the custom environment
    #[arg(long, global = true)]
    url: Option<String>,

    /// Portal username
    #[arg(short, long, global = true)]
    username: Option<String>,

    /// Portal password
    #[arg(long, global = true, env = "OSR_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the tenants the user can enter
    Tenants {
        /// Print the full user info payload as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve gateway connection info for a tenant
    Authorize {
        /// Tenant ID (from `tenants` output)
        #[arg(short, long)]
        tenant: Uuid,

        /// Tenant name; looked up from the tenant list when omitted
        #[arg(short, long)]
        name: Option<String>,

        /// Also switch the session's active tenant context
        #[arg(long)]
        switch: bool,
    },

    /// List built-in portal environments
    Environments,

    /// Show or update stored configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the stored configuration
    Show,
    /// Store --environment, --url and --username (never the password)
    Set,
}

impl Cli {
    /// Stored config with command-line overrides applied.
    fn config(&self) -> Result<Config> {
        let mut config = Config::load()?;
        if let Some(environment) = self.environment {
            config.environment = environment;
        }
        if let Some(url) = &self.url {
            config.custom_url = Some(url.clone());
        }
        if let Some(username) = &self.username {
            config.username = Some(username.clone());
        }
        Ok(config)
    }

    fn settings(&self) -> Result<PortalSettings> {
        let password = self
            .password
            .as_deref()
            .context("No password. Pass --password or set OSR_PASSWORD.")?;
        self.config()?.settings(password)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose);

    match &cli.command {
        Commands::Tenants { json } => {
            let resolver = UserInfoResolver::new(cli.settings()?);
            tracing::info!("Fetching tenants...");
            let info = resolver
                .get_tenant_user_info()
                .await
                .context("Failed to fetch tenant user info")?;

            if *json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("\nTenants:");
                println!("{:-<60}", "");
                if info.tenants.is_empty() {
                    println!("  (no tenants found)");
                }
                for tenant in &info.tenants {
                    println!("  {:<30} {}", tenant.name, tenant.id);
                }
            }
        }
        Commands::Authorize {
            tenant,
            name,
            switch,
        } => {
            let settings = cli.settings()?;
            let name = match name {
                Some(name) => name.clone(),
                None => {
                    tracing::info!("Looking up name of tenant {}...", tenant);
                    let info = UserInfoResolver::new(settings.clone())
                        .get_tenant_user_info()
                        .await
                        .context("Failed to fetch tenant user info")?;
                    match info.find_tenant(*tenant) {
                        Some(found) => found.name.clone(),
                        None => bail!("Tenant {} is not available to this user", tenant),
                    }
                }
            };

            let authorizer = TenantAuthorizer::new(settings);
            let switch_to = switch.then_some(*tenant);
            let info = authorizer
                .authorize_login(&Tenant::new(*tenant, name), switch_to)
                .await
                .context("Tenant login failed")?;

            println!();
            println!("Company:      {}", info.company_name);
            println!("Tenant:       {} ({})", info.tenant_name, info.tenant_id);
            println!("Realtime URL: {}", info.realtime_channel_url);
        }
        Commands::Environments => {
            for env in Environment::NAMED {
                let address = PortalAddress::resolve(env, None)?;
                println!("  {:<12} {}", env, address);
            }
            println!("  {:<12} (--url)", Environment::Custom);
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let config = cli.config()?;
                println!("Config file: {}", Config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&config)?);
            }
            ConfigAction::Set => {
                let config = cli.config()?;
                config.save()?;
                println!("Saved {}", Config::config_path()?.display());
            }
        },
    }

    Ok(())
}
