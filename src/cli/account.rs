//! Account commands: signup, login, delete

use clap::Args;

use crate::domain::DomainError;
use crate::infrastructure::user::CreateUserRequest;
use crate::AppServices;

use super::{require_user, EmailArg};

#[derive(Args)]
pub struct SignupArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    /// Read the password from the first line of stdin instead of prompting
    #[arg(long)]
    pub password_stdin: bool,
}

#[derive(Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,

    /// Read the password from the first line of stdin instead of prompting
    #[arg(long)]
    pub password_stdin: bool,

    /// Issue a remember token on success
    #[arg(long)]
    pub remember: bool,
}

pub async fn signup(services: &AppServices, args: SignupArgs) -> anyhow::Result<()> {
    let (password, password_confirmation) = if args.password_stdin {
        let password = read_password_line()?;
        (password.clone(), password)
    } else {
        (
            rpassword::prompt_password("Password: ")?,
            rpassword::prompt_password("Confirm password: ")?,
        )
    };

    let request = CreateUserRequest {
        name: args.name,
        email: args.email,
        password,
        password_confirmation,
    };

    match services.users.create(request).await {
        Ok(user) => {
            println!("Created user {} <{}> ({})", user.name(), user.email(), user.id());
            Ok(())
        }
        Err(DomainError::Validation(errors)) => {
            for (field, messages) in errors.messages() {
                for message in messages {
                    eprintln!("{} {}", field, message);
                }
            }
            anyhow::bail!("signup rejected")
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn login(services: &AppServices, args: LoginArgs) -> anyhow::Result<()> {
    let password = if args.password_stdin {
        read_password_line()?
    } else {
        rpassword::prompt_password("Password: ")?
    };

    let Some(user) = services.users.authenticate(&args.email, &password).await? else {
        anyhow::bail!("invalid email/password combination");
    };

    println!("Authenticated {} ({})", user.name(), user.id());

    if args.remember {
        let token = services.users.remember(user.id()).await?;
        println!("Remember token: {}", token);
    }

    Ok(())
}

pub async fn delete(services: &AppServices, args: EmailArg) -> anyhow::Result<()> {
    let user = require_user(services, &args.email).await?;

    services.users.delete(user.id()).await?;
    println!("Deleted {} <{}>", user.name(), user.email());

    Ok(())
}

/// First line of stdin without its line ending
fn read_password_line() -> anyhow::Result<String> {
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;

    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
