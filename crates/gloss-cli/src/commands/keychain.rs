use crate::app::{prompt_new_passphrase, AppContext};
use crate::cli::KeychainSubcommand;
use crate::security::{keychain_account, keychain_clear, keychain_set};
use crate::ui::{hint, print, receipt};

pub fn handle_keychain(ctx: &AppContext<'_>, command: &KeychainSubcommand) -> anyhow::Result<()> {
    let store_path = ctx.store_path()?;
    let account = keychain_account(&store_path);
    let ui = ctx.ui(false);
    match command {
        KeychainSubcommand::Set => {
            let passphrase = prompt_new_passphrase()?;
            keychain_set(&account, &passphrase)?;
            if !ctx.quiet() {
                print(
                    &ui,
                    &receipt(&ui, "Passphrase saved to keychain", &[("Store", account)]),
                );
                if !ctx.config()?.security.keychain {
                    print(
                        &ui,
                        &hint(&ui, "Set `keychain = true` under [security] in the config to use it."),
                    );
                }
            }
        }
        KeychainSubcommand::Clear => {
            keychain_clear(&account)?;
            if !ctx.quiet() {
                print(
                    &ui,
                    &receipt(&ui, "Passphrase removed from keychain", &[("Store", account)]),
                );
            }
        }
    }
    Ok(())
}
