/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use anyhow::Context;
use log::{debug, error, info};

use datakit::agent::Agent;
use datakit::config::MainConfig;
use datakit::input::{EnvMap, InputRegistry};

fn main() -> anyhow::Result<()> {
    let Some(proc_args) = datakit::opts::parse_clap().context("failed to parse command line options")?
    else {
        return Ok(());
    };

    // set up process logger early, only proc args is used inside
    let _log_guard = datakit::log::setup(&proc_args).context("failed to setup logger")?;
    datakit::control::panic::set_hook();

    let registry = Arc::new(InputRegistry::default());
    datakit::input::builtin::register_all(&registry).context("failed to register inputs")?;

    if let Some(name) = &proc_args.doc_input {
        return datakit::input::print_doc(&registry, name);
    }

    let envs = datakit::input::env::collect();
    let config = datakit::config::load(&proc_args.config_file, &envs, &registry)
        .context(format!("failed to load config, opts: {proc_args:?}"))?;
    debug!("loaded config from {}", proc_args.config_file.display());
    if let Some(level) = config.log_level {
        datakit::log::set_level(level);
    }

    if proc_args.test_config {
        return test_config(&registry, &config, &envs);
    }

    let ret = tokio_run(config, registry, envs);
    match ret {
        Ok(_) => Ok(()),
        Err(e) => {
            error!("{e:?}");
            Err(e)
        }
    }
}

fn test_config(registry: &InputRegistry, config: &MainConfig, envs: &EnvMap) -> anyhow::Result<()> {
    let inputs = datakit::config::inputs::load_all(registry, config, envs);
    info!("the format of the config file is ok");
    for (name, list) in &inputs {
        println!("{name}: {} instance(s)", list.len());
        for info in list {
            match info.config_path() {
                Some(p) => println!("  {} from {}", info.conf_key(), p.display()),
                None => println!("  {}", info.conf_key()),
            }
        }
    }
    println!("{}", registry.config_info_json());
    Ok(())
}

fn tokio_run(config: MainConfig, registry: Arc<InputRegistry>, envs: EnvMap) -> anyhow::Result<()> {
    let rt = config
        .runtime
        .start()
        .context("failed to start runtime")?;
    rt.block_on(async move {
        let agent = Arc::new(Agent::new(config, registry, envs));
        datakit::signal::register(&agent).context("failed to setup signal handler")?;
        agent.run().await;
        Ok(())
    })
}
