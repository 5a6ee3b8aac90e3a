//! Interactive shopping session.
//!
//! The cart lives only as long as the shell; the session is persisted.
//! Type `help` at the prompt for the command list.

use std::io::Write as _;

use corner_shop_core::ProductId;
use corner_shop_storefront::AppState;
use corner_shop_storefront::catalog::{CategoryFilter, SortOrder};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{CliError, account, catalog, print, print_line};
use crate::output;
use crate::validation::{LoginForm, SignupForm};

const HELP: &str = "\
Commands:
  products [category] [sort]     list products (sort: default, price-low, price-high, name, rating)
  product <id>                   show a product
  add <id>                       add one to the cart
  remove <id>                    remove a line
  qty <id> <n>                   set a quantity (0 or less removes)
  inc <id> / dec <id>            change a quantity by one
  clear                          empty the cart
  cart                           show the cart
  signup <email> <password> <name...>
  login <email> <password>
  logout / whoami
  help / quit
";

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Help,
    Quit,
    Products {
        filter: CategoryFilter,
        sort: SortOrder,
    },
    Product(ProductId),
    Add(ProductId),
    Remove(ProductId),
    SetQuantity(ProductId, i64),
    Increment(ProductId),
    Decrement(ProductId),
    Clear,
    Cart,
    Signup {
        email: String,
        password: String,
        name: String,
    },
    Login {
        email: String,
        password: String,
    },
    Logout,
    Whoami,
}

impl ShellCommand {
    /// Parse one input line. Blank lines parse to `None`.
    ///
    /// # Errors
    ///
    /// Returns a usage message for unknown commands or missing arguments.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let command = match (command, args.as_slice()) {
            ("help" | "?", []) => Self::Help,
            ("quit" | "exit", []) => Self::Quit,
            ("products", rest) => {
                let (filter, sort) = parse_browse(rest)?;
                Self::Products { filter, sort }
            }
            ("product", [id]) => Self::Product(ProductId::new(*id)),
            ("add", [id]) => Self::Add(ProductId::new(*id)),
            ("remove", [id]) => Self::Remove(ProductId::new(*id)),
            ("qty", [id, quantity]) => {
                let quantity = quantity
                    .parse()
                    .map_err(|_| format!("not a quantity: {quantity}"))?;
                Self::SetQuantity(ProductId::new(*id), quantity)
            }
            ("inc", [id]) => Self::Increment(ProductId::new(*id)),
            ("dec", [id]) => Self::Decrement(ProductId::new(*id)),
            ("clear", []) => Self::Clear,
            ("cart", []) => Self::Cart,
            ("signup", [email, password, name @ ..]) => Self::Signup {
                email: (*email).to_owned(),
                password: (*password).to_owned(),
                name: name.join(" "),
            },
            ("login", [email, password]) => Self::Login {
                email: (*email).to_owned(),
                password: (*password).to_owned(),
            },
            ("logout", []) => Self::Logout,
            ("whoami", []) => Self::Whoami,
            (other, _) => return Err(format!("unknown command or arguments: {other} (try help)")),
        };
        Ok(Some(command))
    }
}

fn parse_browse(args: &[&str]) -> Result<(CategoryFilter, SortOrder), String> {
    match args {
        [] => Ok((CategoryFilter::All, SortOrder::Default)),
        [only] => match only.parse::<SortOrder>() {
            Ok(sort) => Ok((CategoryFilter::All, sort)),
            Err(_) => Ok((category(only), SortOrder::Default)),
        },
        [filter, sort] => Ok((category(filter), sort.parse()?)),
        _ => Err("usage: products [category] [sort]".to_owned()),
    }
}

fn category(word: &str) -> CategoryFilter {
    word.parse().unwrap_or(CategoryFilter::All)
}

/// Run the shell until end of input or `quit`.
///
/// # Errors
///
/// Returns an error only if standard input cannot be read.
pub async fn run(state: &AppState) -> Result<(), CliError> {
    print(HELP);
    if let Some(session) = state.auth().session() {
        print_line(&format!("Welcome back, {}!", session.name));
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match ShellCommand::parse(&line) {
            Ok(None) => {}
            Ok(Some(ShellCommand::Quit)) => break,
            Ok(Some(command)) => {
                if let Err(err) = execute(state, command).await {
                    if err.is_fault() {
                        tracing::warn!(error = %err, "shell command failed");
                    }
                    print_line(&err.user_message());
                }
            }
            Err(usage) => print_line(&usage),
        }
    }
    Ok(())
}

/// Apply one command to the storefront.
///
/// # Errors
///
/// Returns the command's failure; the shell reports it and keeps going.
pub async fn execute(state: &AppState, command: ShellCommand) -> Result<(), CliError> {
    let cart = state.cart();
    match command {
        ShellCommand::Help => print(HELP),
        ShellCommand::Quit => {}
        ShellCommand::Products { filter, sort } => catalog::list(state, &filter, sort),
        ShellCommand::Product(id) => catalog::show(state, &id)?,
        ShellCommand::Add(id) => {
            let product = catalog::find(state, &id)?;
            if !product.in_stock {
                return Err(CliError::OutOfStock(product.name.clone()));
            }
            cart.add_item(product);
        }
        ShellCommand::Remove(id) => cart.remove_item(&id),
        ShellCommand::SetQuantity(id, quantity) => cart.set_quantity(&id, quantity),
        ShellCommand::Increment(id) => cart.increment(&id),
        ShellCommand::Decrement(id) => cart.decrement(&id),
        ShellCommand::Clear => cart.clear(),
        ShellCommand::Cart => print(&output::cart(&cart.lines(), &state.cart_summary())),
        ShellCommand::Signup {
            email,
            password,
            name,
        } => {
            let form = SignupForm {
                name: &name,
                email: &email,
                password: &password,
                confirm_password: &password,
            };
            account::signup(state.auth(), form).await?;
        }
        ShellCommand::Login { email, password } => {
            let form = LoginForm {
                email: &email,
                password: &password,
            };
            account::login(state.auth(), form).await?;
        }
        ShellCommand::Logout => account::logout(state.auth())?,
        ShellCommand::Whoami => account::whoami(state.auth()),
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn prompt() -> std::io::Result<()> {
    print!("shop> ");
    std::io::stdout().flush()
}
