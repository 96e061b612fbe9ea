mod app_run;
mod scenarios;
