//! Text -> graph -> text on complete scripts.

use luavisual::{Config, StructureEq, graph_to_text, text_to_graph};

fn roundtrip(source: &str) -> String {
    let config = Config::default();
    let result = text_to_graph(source, &config);
    assert_eq!(result.error, None, "{source}");
    graph_to_text(&result.graph(), &result.header, &config)
}

const BANK_SCRIPT: &str = r#"local QBCore = exports['qb-core']:GetCoreObject()
local cooldown = 0

RegisterNetEvent('bank:withdraw', function(amount)
    local balance = 100
    if amount > balance then
        QBCore.Functions.Notify('Not enough money', 'error')
    elseif amount == 0 then
        return
    else
        balance -= amount
        TriggerServerEvent('bank:save', balance)
    end
end)

CreateThread(function()
    while true do
        Wait(0)
        for i = 1, 3 do
            DrawRect(0.5, 0.5, 0.1, 0.1, 255, 0, 0, 200)
        end
        for _, player in ipairs(GetActivePlayers()) do
            SetTextFont(4)
        end
    end
end)

QBCore.Commands.Add('heal', 'Heal a player', {}, false, function(source, args)
    local target = tonumber(args[1])
    TriggerClientEvent('hospital:heal', target)
end, 'admin')
"#;

#[test]
fn normalized_script_is_reproduced() {
    assert_eq!(roundtrip(BANK_SCRIPT), BANK_SCRIPT.trim_end());
}

#[test]
fn bank_script_node_kinds() {
    let result = text_to_graph(BANK_SCRIPT, &Config::default());
    assert_eq!(
        result.header,
        "local QBCore = exports['qb-core']:GetCoreObject()\nlocal cooldown = 0"
    );
    let kinds: Vec<_> = result.nodes.iter().map(|n| n.kind.as_str()).collect();
    assert_eq!(
        kinds,
        vec![
            "register-net",
            "variable",
            "logic-if",
            "qb-notify",
            "logic-if",
            "logic-return",
            "variable",
            "event-trigger",
            "thread-create",
            "logic-loop",
            "wait",
            "logic-for",
            "draw-rect",
            "logic-for-in",
            "set-text-font",
            "qb-command",
            "variable",
            "event-trigger",
        ]
    );
}

#[test]
fn second_pass_is_stable() {
    let source = "AddEventHandler(\"playerSpawned\", function()\n  print(\"it's alive\")\n  Citizen.Wait(500)\n  local   x=1+2*3\nend)";
    let first = roundtrip(source);
    assert_eq!(
        first,
        "AddEventHandler('playerSpawned', function()\n    print('it\\'s alive')\n    Wait(500)\n    local x = 1 + 2 * 3\nend)"
    );
    assert_eq!(roundtrip(&first), first);

    let config = Config::default();
    let a = text_to_graph(&first, &config).graph();
    let b = text_to_graph(&roundtrip(&first), &config).graph();
    assert!(a.structure_eq(&b));
}

#[test]
fn unknown_calls_with_handlers_stay_verbatim() {
    let source = "lib.callback.register('shop:buy', function(source, item)\n    return true\nend)";
    assert_eq!(roundtrip(source), source);
}

#[test]
fn top_level_leaves_chain_into_one_block() {
    let source = "RegisterNetEvent('a')\nRegisterNetEvent('b')\n\nAddEventHandler('a', function(...)\nend)";
    let result = text_to_graph(source, &Config::default());
    assert_eq!(result.edges.len(), 2);
    assert_eq!(
        roundtrip(source),
        "RegisterNetEvent('a')\nRegisterNetEvent('b')\nAddEventHandler('a', function(...)\nend)"
    );
}

#[test]
fn registration_inside_helper_stays_in_header() {
    let source = "local QBCore = exports['qb-core']:GetCoreObject()\n\nlocal function setup()\n    RegisterNetEvent('bank:open')\nend\n\nRegisterCommand('heal', function(source, args)\n    print('healed')\nend)";
    let result = text_to_graph(source, &Config::default());
    assert_eq!(result.error, None);
    assert_eq!(
        result.header,
        "local QBCore = exports['qb-core']:GetCoreObject()\n\nlocal function setup()\n    RegisterNetEvent('bank:open')\nend"
    );
    let kinds: Vec<_> = result.nodes.iter().map(|n| n.kind.as_str()).collect();
    assert_eq!(kinds, vec!["event-start", "logic-print"]);
    assert_eq!(roundtrip(source), source);
}
