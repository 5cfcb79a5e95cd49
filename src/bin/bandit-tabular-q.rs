//! Train a tabular Q learning agent on a Bernoulli bandit with best-model
//! checkpointing, then evaluate the greedy policy.
use lightpath_rl::agents::TabularQLearningAgentConfig;
use lightpath_rl::envs::BernoulliBanditConfig;
use lightpath_rl::logging::CLILogger;
use lightpath_rl::{
    evaluate, learn, AgentBuilder, BestModelCheckpointer, BuildEnv, Monitor, RunConfig, RunError,
    StorageError, StructuredEnvironment,
};
use std::fs;
use std::time::Duration;

fn main() -> Result<(), RunError> {
    let run_config = RunConfig::default();
    fs::create_dir_all(&run_config.log_dir).map_err(|source| StorageError::CreateDir {
        path: run_config.log_dir.clone(),
        source,
    })?;
    run_config.save(run_config.log_dir.join("run.json"))?;

    let env_config = BernoulliBanditConfig {
        probabilities: vec![0.2, 0.8, 0.5],
    };
    let env = env_config.build_env(1)?;
    let structure = env.structure();
    let mut env = Monitor::new(
        env,
        run_config.log_dir.join("training"),
        "bernoulli-bandit",
        &[],
    )?;

    let mut agent = TabularQLearningAgentConfig::default().build(structure, 2)?;
    let mut checkpointer = BestModelCheckpointer::new(
        run_config.check_interval,
        &run_config.log_dir,
        run_config.verbosity,
    )?;
    let mut logger = CLILogger::new(Duration::from_secs(1));

    learn(
        &mut env,
        &mut agent,
        run_config.total_timesteps,
        &mut checkpointer,
        &mut logger,
    );
    drop(logger);

    agent.set_exploration_rate(0.0);
    let mut eval_env = env_config.build_env(3)?;
    let summary = evaluate(&mut eval_env, &mut agent, run_config.n_eval_episodes);
    println!(
        "mean reward {:.3} over {} evaluation episodes",
        summary.mean_reward, summary.num_episodes
    );
    println!(
        "best mean training reward {:.3}; model saved under {}",
        checkpointer.best_mean_reward(),
        checkpointer.save_path().display()
    );
    Ok(())
}
